use super::aggregate::{
    box_summaries, group_count, histogram, summarize, GroupAggregate, GroupBox, HistogramBin,
    SummaryMetrics,
};
use super::error::InvalidFilterError;
use super::filter::{apply, FilterSpec, FilteredView};
use super::model::{CategoricalField, NumericField, Table};

/// Number of equal-width bins in the odometer histogram.
pub const HISTOGRAM_BINS: usize = 40;

/// Everything the central panel draws when at least one listing matches.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    pub view: FilteredView<'a>,
    pub metrics: SummaryMetrics,
    pub by_type: GroupAggregate,
    pub odometer_histogram: Vec<HistogramBin>,
    pub price_by_condition: Vec<GroupBox>,
}

/// Result of one evaluation of the filters.
#[derive(Debug, Clone)]
pub enum Outcome<'a> {
    /// No listing matched; nothing is aggregated.
    NoData,
    HasData(Report<'a>),
}

impl<'a> Outcome<'a> {
    pub fn visible(&self) -> usize {
        match self {
            Outcome::NoData => 0,
            Outcome::HasData(report) => report.view.len(),
        }
    }
}

/// Filter `table` by `spec` and, if anything matches, derive every metric and
/// chart table from the result. Nothing is cached between calls.
pub fn evaluate<'a>(table: &'a Table, spec: &FilterSpec) -> Result<Outcome<'a>, InvalidFilterError> {
    let view = apply(table, spec)?;
    if view.is_empty() {
        return Ok(Outcome::NoData);
    }
    let Some(metrics) = summarize(&view) else {
        return Ok(Outcome::NoData);
    };

    Ok(Outcome::HasData(Report {
        by_type: group_count(&view, CategoricalField::Type),
        odometer_histogram: histogram(&view, NumericField::Odometer, HISTOGRAM_BINS),
        price_by_condition: box_summaries(&view, NumericField::Price, CategoricalField::Condition),
        metrics,
        view,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::lot;

    #[test]
    fn test_has_data() {
        let table = lot();
        let spec = FilterSpec::defaults_for(&table);
        let Outcome::HasData(report) = evaluate(&table, &spec).unwrap() else {
            panic!("expected data");
        };
        assert_eq!(report.metrics.count, table.len());
        assert_eq!(report.by_type.total(), table.len());
        assert_eq!(
            report.odometer_histogram.iter().map(|b| b.count).sum::<usize>(),
            table.len()
        );
        assert_eq!(report.price_by_condition.len(), 4);
    }

    #[test]
    fn test_no_data() {
        let table = lot();
        let spec = FilterSpec::defaults_for(&table)
            .with_categories(CategoricalField::Condition, Vec::<String>::new());
        let outcome = evaluate(&table, &spec).unwrap();
        assert!(matches!(outcome, Outcome::NoData));
        assert_eq!(outcome.visible(), 0);
    }

    #[test]
    fn test_invalid_spec_is_an_error() {
        let table = lot();
        let spec: FilterSpec =
            serde_json::from_str(r#"{"numeric": {"price": {"min": 10.0, "max": 1.0}}}"#).unwrap();
        assert!(evaluate(&table, &spec).is_err());
    }

    #[test]
    fn test_empty_table_is_no_data() {
        let table = Table::default();
        let outcome = evaluate(&table, &FilterSpec::new()).unwrap();
        assert!(matches!(outcome, Outcome::NoData));
        assert_eq!(outcome.visible(), 0);
    }

    #[test]
    fn test_range_excluding_everything_is_no_data() {
        let table = lot();
        let spec = FilterSpec::defaults_for(&table)
            .with_range(NumericField::Price, 1.0e9, 2.0e9)
            .unwrap();
        let outcome = evaluate(&table, &spec).unwrap();
        assert!(matches!(outcome, Outcome::NoData));
        assert_eq!(outcome.visible(), 0);
    }
}
