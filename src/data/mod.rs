/// Data layer: listing types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, drop incomplete rows → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterSpec → FilteredView (row positions)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  metrics, group counts, histogram, box summaries
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ dashboard  │  NoData / HasData report for the UI
///   └───────────┘
/// ```

pub mod aggregate;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::model::{Record, Table};

    pub fn listing(
        year: i32,
        condition: &str,
        fuel: &str,
        price: f64,
        odometer: f64,
        vehicle_type: &str,
    ) -> Record {
        Record {
            model_year: year,
            odometer,
            price,
            condition: condition.to_string(),
            fuel: fuel.to_string(),
            model: Some("ford f-150".to_string()),
            vehicle_type: Some(vehicle_type.to_string()),
        }
    }

    /// The two-row table used throughout the filter scenarios.
    pub fn two_rows() -> Table {
        Table::from_records(
            vec![
                listing(2015, "good", "gas", 10000.0, 50000.0, "sedan"),
                listing(2018, "excellent", "diesel", 20000.0, 20000.0, "suv"),
            ],
            0,
        )
    }

    /// A mixed table covering every condition/fuel combination of interest.
    pub fn lot() -> Table {
        let mut missing_type = listing(2010, "fair", "gas", 3500.0, 180000.0, "truck");
        missing_type.vehicle_type = None;
        Table::from_records(
            vec![
                listing(2015, "good", "gas", 10000.0, 50000.0, "sedan"),
                listing(2018, "excellent", "diesel", 20000.0, 20000.0, "suv"),
                listing(2011, "good", "gas", 6500.0, 140000.0, "pickup"),
                listing(2019, "like new", "hybrid", 24000.0, 12000.0, "sedan"),
                missing_type,
                listing(2016, "excellent", "gas", 15000.0, 60000.0, "suv"),
                listing(2013, "good", "diesel", 9000.0, 98000.0, "truck"),
                listing(2017, "good", "gas", 12500.0, 45000.0, "sedan"),
            ],
            0,
        )
    }
}
