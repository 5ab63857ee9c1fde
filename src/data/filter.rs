use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::error::InvalidFilterError;
use super::model::{CategoricalField, Field, NumericField, Record, Table};

// ---------------------------------------------------------------------------
// Filter specification: accepted values per column, ranges per column
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` bound on a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    fn check(&self, field: NumericField) -> Result<(), InvalidFilterError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(InvalidFilterError::NonFiniteBound(field.name().to_string()));
        }
        if self.min > self.max {
            return Err(InvalidFilterError::InvertedRange {
                field: field.name().to_string(),
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Declarative filter criteria, conjoined across all columns.
///
/// * A column absent from both maps is unconstrained.
/// * A categorical column mapped to an empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    categorical: BTreeMap<CategoricalField, BTreeSet<String>>,
    #[serde(default)]
    numeric: BTreeMap<NumericField, NumericRange>,
}

impl FilterSpec {
    /// A specification with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// The dashboard's initial selection: every condition and fuel, full year range.
    pub fn defaults_for(table: &Table) -> Self {
        let mut spec = FilterSpec::new()
            .with_categories(CategoricalField::Condition, table.distinct(CategoricalField::Condition))
            .with_categories(CategoricalField::Fuel, table.distinct(CategoricalField::Fuel));
        if let Some((min, max)) = table.year_bounds() {
            spec.numeric.insert(
                NumericField::ModelYear,
                NumericRange {
                    min: f64::from(min),
                    max: f64::from(max),
                },
            );
        }
        spec
    }

    /// Accept only `values` for `field`, replacing any earlier selection.
    pub fn with_categories<I, S>(mut self, field: CategoricalField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical
            .insert(field, values.into_iter().map(Into::into).collect());
        self
    }

    /// Constrain `field` to `[min, max]`, rejecting inverted or non-finite bounds.
    pub fn with_range(
        mut self,
        field: NumericField,
        min: f64,
        max: f64,
    ) -> Result<Self, InvalidFilterError> {
        let range = NumericRange { min, max };
        range.check(field)?;
        self.numeric.insert(field, range);
        Ok(self)
    }

    /// Like [`with_categories`](Self::with_categories) but resolves the column by name.
    pub fn with_categories_named<I, S>(self, name: &str, values: I) -> Result<Self, InvalidFilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match name.parse::<Field>()? {
            Field::Categorical(field) => Ok(self.with_categories(field, values)),
            Field::Numeric(_) => Err(InvalidFilterError::NotCategorical(name.to_string())),
        }
    }

    /// Like [`with_range`](Self::with_range) but resolves the column by name.
    pub fn with_range_named(self, name: &str, min: f64, max: f64) -> Result<Self, InvalidFilterError> {
        match name.parse::<Field>()? {
            Field::Numeric(field) => self.with_range(field, min, max),
            Field::Categorical(_) => Err(InvalidFilterError::NotNumeric(name.to_string())),
        }
    }

    pub fn categories(&self, field: CategoricalField) -> Option<&BTreeSet<String>> {
        self.categorical.get(&field)
    }

    pub fn range(&self, field: NumericField) -> Option<NumericRange> {
        self.numeric.get(&field).copied()
    }

    /// Check every range. Specs built through the `with_*` methods always pass;
    /// deserialized ones may not.
    pub fn validate(&self) -> Result<(), InvalidFilterError> {
        self.numeric
            .iter()
            .try_for_each(|(field, range)| range.check(*field))
    }

    /// Whether one record satisfies every predicate.
    ///
    /// A record passes a categorical predicate when:
    /// * The accepted set is empty → nothing selected → fails
    /// * The record has no value for the column → fails
    /// * The record's value is in the accepted set → passes
    pub fn matches(&self, record: &Record) -> bool {
        let categories_ok = self.categorical.iter().all(|(field, accepted)| {
            record
                .category(*field)
                .is_some_and(|value| accepted.contains(value))
        });
        categories_ok
            && self
                .numeric
                .iter()
                .all(|(field, range)| range.contains(record.number(*field)))
    }

    /// The conjunction of both specifications.
    ///
    /// Where both constrain the same column the accepted sets are intersected
    /// and the ranges narrowed; `None` if two ranges do not overlap, since no
    /// valid range can express an empty interval.
    pub fn and(&self, other: &FilterSpec) -> Option<FilterSpec> {
        let mut merged = self.clone();
        for (field, accepted) in &other.categorical {
            merged
                .categorical
                .entry(*field)
                .and_modify(|mine| *mine = mine.intersection(accepted).cloned().collect())
                .or_insert_with(|| accepted.clone());
        }
        for (field, range) in &other.numeric {
            let narrowed = match merged.numeric.get(field) {
                Some(mine) => NumericRange {
                    min: mine.min.max(range.min),
                    max: mine.max.min(range.max),
                },
                None => *range,
            };
            if narrowed.min > narrowed.max {
                return None;
            }
            merged.numeric.insert(*field, narrowed);
        }
        Some(merged)
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Rows of a [`Table`] that passed a filter, in source order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row of `table`.
    pub fn all(table: &'a Table) -> Self {
        FilteredView {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    /// Positions of the matching rows in the source table (ascending).
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.table.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn get(&self, position: usize) -> Option<&'a Record> {
        let records = self.table.records();
        self.indices.get(position).map(|&i| &records[i])
    }

    /// Narrow this view by a further specification.
    pub fn refine(&self, spec: &FilterSpec) -> Result<FilteredView<'a>, InvalidFilterError> {
        spec.validate()?;
        let records = self.table.records();
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| spec.matches(&records[i]))
            .collect();
        Ok(FilteredView {
            table: self.table,
            indices,
        })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the view of `table` rows that pass every predicate of `spec`.
pub fn apply<'a>(table: &'a Table, spec: &FilterSpec) -> Result<FilteredView<'a>, InvalidFilterError> {
    FilteredView::all(table).refine(spec)
}
