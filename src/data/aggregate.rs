use std::cmp::Ordering;
use std::collections::HashMap;

use super::filter::FilteredView;
use super::model::{CategoricalField, NumericField, UNKNOWN_LABEL};

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Scalar aggregates shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryMetrics {
    pub count: usize,
    pub mean_price: f64,
    pub mean_odometer: f64,
}

/// Arithmetic mean of a numeric column, `None` for an empty view.
pub fn mean(view: &FilteredView<'_>, field: NumericField) -> Option<f64> {
    if view.is_empty() {
        return None;
    }
    let total: f64 = view.records().map(|r| r.number(field)).sum();
    Some(total / view.len() as f64)
}

/// Mean price, mean odometer, and row count; `None` means "no data".
pub fn summarize(view: &FilteredView<'_>) -> Option<SummaryMetrics> {
    Some(SummaryMetrics {
        count: view.len(),
        mean_price: mean(view, NumericField::Price)?,
        mean_odometer: mean(view, NumericField::Odometer)?,
    })
}

// ---------------------------------------------------------------------------
// Group counts
// ---------------------------------------------------------------------------

/// One bucket of a [`GroupAggregate`]. `value` is `None` for rows where the
/// optional column was empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub value: Option<String>,
    pub count: usize,
}

impl GroupCount {
    pub fn label(&self) -> &str {
        self.value.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// Row counts per distinct value of a categorical column.
///
/// Entries keep the order in which each value first appeared in the view;
/// values with no rows never appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAggregate {
    pub field: CategoricalField,
    entries: Vec<GroupCount>,
}

impl GroupAggregate {
    pub fn entries(&self) -> &[GroupCount] {
        &self.entries
    }

    pub fn count_of(&self, value: Option<&str>) -> usize {
        self.entries
            .iter()
            .find(|e| e.value.as_deref() == value)
            .map_or(0, |e| e.count)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Largest groups first; ties broken by label.
    pub fn sorted_by_count(mut self) -> Self {
        self.entries
            .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label().cmp(b.label())));
        self
    }

    /// Alphabetical by label, the unknown bucket sorting first.
    pub fn sorted_by_label(mut self) -> Self {
        self.entries.sort_by(|a, b| a.value.cmp(&b.value));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Count rows per distinct value of `field`.
pub fn group_count(view: &FilteredView<'_>, field: CategoricalField) -> GroupAggregate {
    let mut positions: HashMap<Option<&str>, usize> = HashMap::new();
    let mut entries: Vec<GroupCount> = Vec::new();

    for rec in view.records() {
        let value = rec.category(field);
        let pos = *positions.entry(value).or_insert_with(|| {
            entries.push(GroupCount {
                value: value.map(str::to_string),
                count: 0,
            });
            entries.len() - 1
        });
        entries[pos].count += 1;
    }

    GroupAggregate { field, entries }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// A `[start, end)` bin; the last bin of a histogram also includes `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width histogram of `field` over the view's observed range.
///
/// An empty view yields no bins; a view where every value is equal yields one
/// zero-width bin holding every row.
pub fn histogram(view: &FilteredView<'_>, field: NumericField, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = view.records().map(|r| r.number(field)).collect();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    if bins == 0 || max <= min {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Box plot summaries
// ---------------------------------------------------------------------------

/// Five-number summary of one group, whiskers at 1.5 × IQR.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// `None` for an empty sample.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25);
        let median = quantile(&values, 0.5);
        let q3 = quantile(&values, 0.75);
        let fence = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - fence, q3 + fence);

        let inside = values.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
        let lower_whisker = inside.clone().reduce(f64::min).unwrap_or(q1);
        let upper_whisker = inside.reduce(f64::max).unwrap_or(q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

/// Linear interpolation between closest ranks of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// A [`BoxSummary`] labelled with its group value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBox {
    pub value: Option<String>,
    pub summary: BoxSummary,
}

impl GroupBox {
    pub fn label(&self) -> &str {
        self.value.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// Box summary of `value` for each distinct `by` value, in first-occurrence order.
pub fn box_summaries(
    view: &FilteredView<'_>,
    value: NumericField,
    by: CategoricalField,
) -> Vec<GroupBox> {
    let mut order: Vec<Option<&str>> = Vec::new();
    let mut samples: HashMap<Option<&str>, Vec<f64>> = HashMap::new();

    for rec in view.records() {
        let key = rec.category(by);
        samples
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(rec.number(value));
    }

    order
        .into_iter()
        .filter_map(|key| {
            let summary = BoxSummary::from_values(samples.remove(&key)?)?;
            Some(GroupBox {
                value: key.map(str::to_string),
                summary,
            })
        })
        .collect()
}

/// Orders group labels for display; the unknown bucket goes last.
pub fn compare_labels(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSpec};
    use crate::data::fixtures::{lot, two_rows};

    #[test]
    fn test_summarize_single_row() {
        let table = two_rows();
        let spec = FilterSpec::new().with_categories(CategoricalField::Condition, ["good"]);
        let view = apply(&table, &spec).unwrap();
        let metrics = summarize(&view).unwrap();
        assert_eq!(
            metrics,
            SummaryMetrics {
                count: 1,
                mean_price: 10000.0,
                mean_odometer: 50000.0,
            }
        );
    }

    #[test]
    fn test_summarize_means() {
        let table = lot();
        let view = FilteredView::all(&table);
        let metrics = summarize(&view).unwrap();
        let prices: Vec<f64> = table.records().iter().map(|r| r.price).collect();
        assert_eq!(metrics.count, view.len());
        assert_eq!(metrics.mean_price, prices.iter().sum::<f64>() / prices.len() as f64);
    }

    #[test]
    fn test_summarize_empty_is_no_data() {
        let table = lot();
        let spec = FilterSpec::new().with_categories(CategoricalField::Fuel, ["electric"]);
        let view = apply(&table, &spec).unwrap();
        assert!(summarize(&view).is_none());
        assert!(mean(&view, NumericField::Price).is_none());
    }

    #[test]
    fn test_group_count_first_occurrence_order() {
        let table = lot();
        let counts = group_count(&FilteredView::all(&table), CategoricalField::Type);
        let labels: Vec<&str> = counts.entries().iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["sedan", "suv", "pickup", UNKNOWN_LABEL, "truck"]);
        assert_eq!(counts.count_of(Some("sedan")), 3);
        assert_eq!(counts.count_of(None), 1);
        assert_eq!(counts.count_of(Some("coupe")), 0);
        assert_eq!(counts.total(), table.len());
    }

    #[test]
    fn test_group_count_only_present_values() {
        let table = lot();
        let spec = FilterSpec::new().with_categories(CategoricalField::Fuel, ["diesel"]);
        let view = apply(&table, &spec).unwrap();
        let counts = group_count(&view, CategoricalField::Type);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.total(), view.len());
        assert!(counts.entries().iter().all(|e| e.count > 0));
    }

    #[test]
    fn test_group_count_sorting() {
        let table = lot();
        let by_count = group_count(&FilteredView::all(&table), CategoricalField::Condition)
            .sorted_by_count();
        let labels: Vec<&str> = by_count.entries().iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["good", "excellent", "fair", "like new"]);

        let by_label = by_count.sorted_by_label();
        let labels: Vec<&str> = by_label.entries().iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["excellent", "fair", "good", "like new"]);
    }

    #[test]
    fn test_histogram_covers_every_row() {
        let table = lot();
        let view = FilteredView::all(&table);
        let bins = histogram(&view, NumericField::Odometer, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].start, 12000.0);
        assert_eq!(bins[3].end, 180000.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), view.len());
        // The maximum lands in the closed last bin.
        assert!(bins[3].count >= 1);
    }

    #[test]
    fn test_histogram_degenerate_and_empty() {
        let table = two_rows();
        let spec = FilterSpec::new().with_categories(CategoricalField::Fuel, ["gas"]);
        let view = apply(&table, &spec).unwrap();
        let bins = histogram(&view, NumericField::Odometer, 10);
        assert_eq!(
            bins,
            vec![HistogramBin {
                start: 50000.0,
                end: 50000.0,
                count: 1,
            }]
        );

        let none = FilterSpec::new().with_categories(CategoricalField::Fuel, Vec::<String>::new());
        let empty = apply(&table, &none).unwrap();
        assert!(histogram(&empty, NumericField::Odometer, 10).is_empty());
    }

    #[test]
    fn test_box_summary_quartiles() {
        let summary = BoxSummary::from_values(vec![4.0, 1.0, 3.0, 2.0, 100.0]).unwrap();
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 4.0);
        assert_eq!(summary.outliers, vec![100.0]);

        let even = BoxSummary::from_values(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.q1, 1.75);
        assert_eq!(even.median, 2.5);
        assert_eq!(even.q3, 3.25);
        assert!(even.outliers.is_empty());

        assert!(BoxSummary::from_values(Vec::new()).is_none());
    }

    #[test]
    fn test_box_summaries_by_condition() {
        let table = lot();
        let boxes = box_summaries(
            &FilteredView::all(&table),
            NumericField::Price,
            CategoricalField::Condition,
        );
        let labels: Vec<&str> = boxes.iter().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["good", "excellent", "like new", "fair"]);

        // good: 6500, 9000, 10000, 12500
        let good = &boxes[0].summary;
        assert_eq!(good.median, 9500.0);
        assert_eq!(good.lower_whisker, 6500.0);
        assert_eq!(good.upper_whisker, 12500.0);
    }

    #[test]
    fn test_compare_labels_unknown_last() {
        let mut labels = vec![None, Some("suv"), Some("coupe")];
        labels.sort_by(|a, b| compare_labels(*a, *b));
        assert_eq!(labels, vec![Some("coupe"), Some("suv"), None]);
    }
}
