use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::InvalidFilterError;

/// Label used wherever an optional text field has no value.
pub const UNKNOWN_LABEL: &str = "(unknown)";

// ---------------------------------------------------------------------------
// Fields – the closed schema of a listing
// ---------------------------------------------------------------------------

/// Text-valued columns that can be selected from a fixed set of options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Condition,
    Fuel,
    Model,
    Type,
}

/// Number-valued columns that can be constrained by an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    ModelYear,
    Odometer,
    Price,
}

/// Any column of the listing schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Categorical(CategoricalField),
    Numeric(NumericField),
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 4] = [
        CategoricalField::Condition,
        CategoricalField::Fuel,
        CategoricalField::Model,
        CategoricalField::Type,
    ];

    /// Column name as it appears in source files.
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Condition => "condition",
            CategoricalField::Fuel => "fuel",
            CategoricalField::Model => "model",
            CategoricalField::Type => "type",
        }
    }
}

impl NumericField {
    pub const ALL: [NumericField; 3] = [
        NumericField::ModelYear,
        NumericField::Odometer,
        NumericField::Price,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::ModelYear => "model_year",
            NumericField::Odometer => "odometer",
            NumericField::Price => "price",
        }
    }
}

impl FromStr for Field {
    type Err = InvalidFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoricalField::ALL
            .iter()
            .find(|f| f.name() == s)
            .map(|f| Field::Categorical(*f))
            .or_else(|| {
                NumericField::ALL
                    .iter()
                    .find(|f| f.name() == s)
                    .map(|f| Field::Numeric(*f))
            })
            .ok_or_else(|| InvalidFilterError::UnknownField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Record – one listing
// ---------------------------------------------------------------------------

/// A single cleaned listing (one row of the source table).
///
/// The five required fields are always present; `model` and `type` may be
/// absent in the source and stay optional.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub model_year: i32,
    pub odometer: f64,
    pub price: f64,
    pub condition: String,
    pub fuel: String,
    pub model: Option<String>,
    pub vehicle_type: Option<String>,
}

impl Record {
    /// Value of a categorical field, `None` when the optional column was empty.
    pub fn category(&self, field: CategoricalField) -> Option<&str> {
        match field {
            CategoricalField::Condition => Some(&self.condition),
            CategoricalField::Fuel => Some(&self.fuel),
            CategoricalField::Model => self.model.as_deref(),
            CategoricalField::Type => self.vehicle_type.as_deref(),
        }
    }

    pub fn number(&self, field: NumericField) -> f64 {
        match field {
            NumericField::ModelYear => f64::from(self.model_year),
            NumericField::Odometer => self.odometer,
            NumericField::Price => self.price,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned listings with pre-computed option lists for the filter widgets.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    /// For each categorical column the sorted set of present values.
    unique_values: BTreeMap<CategoricalField, BTreeSet<String>>,
    /// Source rows discarded because a required field was missing.
    dropped_rows: usize,
}

impl Table {
    /// Build column indices from already-cleaned records.
    pub fn from_records(records: Vec<Record>, dropped_rows: usize) -> Self {
        let mut unique_values: BTreeMap<CategoricalField, BTreeSet<String>> = BTreeMap::new();
        for rec in &records {
            for field in CategoricalField::ALL {
                if let Some(val) = rec.category(field) {
                    unique_values
                        .entry(field)
                        .or_default()
                        .insert(val.to_string());
                }
            }
        }
        Table {
            records,
            unique_values,
            dropped_rows,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted distinct values of a categorical column (empty if none present).
    pub fn distinct(&self, field: CategoricalField) -> BTreeSet<String> {
        self.unique_values.get(&field).cloned().unwrap_or_default()
    }

    /// Observed `(min, max)` model year, `None` for an empty table.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.model_year).min()?;
        let max = self.records.iter().map(|r| r.model_year).max()?;
        Some((min, max))
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::listing;

    #[test]
    fn test_field_from_str() {
        assert_eq!(
            "condition".parse::<Field>(),
            Ok(Field::Categorical(CategoricalField::Condition))
        );
        assert_eq!(
            "model_year".parse::<Field>(),
            Ok(Field::Numeric(NumericField::ModelYear))
        );
        assert_eq!(
            "colour".parse::<Field>(),
            Err(InvalidFilterError::UnknownField("colour".to_string()))
        );
    }

    #[test]
    fn test_table_indices() {
        let mut no_type = listing(2012, "fair", "gas", 4000.0, 120000.0, "sedan");
        no_type.vehicle_type = None;
        let table = Table::from_records(
            vec![
                listing(2015, "good", "gas", 10000.0, 50000.0, "sedan"),
                listing(2018, "excellent", "diesel", 20000.0, 20000.0, "suv"),
                no_type,
            ],
            4,
        );

        assert_eq!(table.len(), 3);
        assert_eq!(table.dropped_rows(), 4);
        assert_eq!(table.year_bounds(), Some((2012, 2018)));
        assert_eq!(
            table.distinct(CategoricalField::Condition).into_iter().collect::<Vec<_>>(),
            vec!["excellent", "fair", "good"]
        );
        assert_eq!(
            table.distinct(CategoricalField::Type).into_iter().collect::<Vec<_>>(),
            vec!["sedan", "suv"]
        );
    }

    #[test]
    fn test_empty_table_has_no_bounds() {
        let table = Table::from_records(Vec::new(), 0);
        assert!(table.is_empty());
        assert_eq!(table.year_bounds(), None);
        assert!(table.distinct(CategoricalField::Fuel).is_empty());
    }
}
