use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::dashboard::evaluate;
use crate::data::filter::FilterSpec;
use crate::data::loader::load_file;
use crate::data::model::{CategoricalField, NumericField, Table};

/// File looked up in the working directory at startup.
pub const DEFAULT_DATA_FILE: &str = "vehicles_us.csv";

// ---------------------------------------------------------------------------
// Widget state
// ---------------------------------------------------------------------------

/// Sidebar selections. A [`FilterSpec`] is rebuilt from these every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterControls {
    pub conditions: BTreeSet<String>,
    pub fuels: BTreeSet<String>,
    /// Inclusive model-year range; `from <= to` is kept by the setters.
    pub years: (i32, i32),
}

/// Which charts are drawn. All on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartToggles {
    pub histogram: bool,
    pub scatter: bool,
    pub bars: bool,
    pub box_plot: bool,
}

impl Default for ChartToggles {
    fn default() -> Self {
        Self {
            histogram: true,
            scatter: true,
            bars: true,
            box_plot: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded listings (None until a file loads successfully).
    pub table: Option<Table>,

    /// Where `table` came from.
    pub source: Option<PathBuf>,

    pub controls: FilterControls,

    pub charts: ChartToggles,

    /// Colours of the condition values, fixed per table.
    pub condition_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load `path` and make it the current table. On failure the previous
    /// table is dropped and the error is kept for the status bar.
    pub fn open(&mut self, path: &Path) {
        match load_file(path).with_context(|| format!("loading {}", path.display())) {
            Ok(table) => {
                self.set_table(table);
                self.source = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.table = None;
                self.source = None;
                self.condition_colors = None;
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Load [`DEFAULT_DATA_FILE`] if it exists in the working directory.
    pub fn open_default(&mut self) {
        let path = Path::new(DEFAULT_DATA_FILE);
        if path.exists() {
            self.open(path);
        } else {
            log::info!("{DEFAULT_DATA_FILE} not found, waiting for File → Open");
        }
    }

    /// Ingest a newly loaded table and reset every control to "show all".
    pub fn set_table(&mut self, table: Table) {
        let conditions = table.distinct(CategoricalField::Condition);
        self.condition_colors = Some(ColorMap::new(&conditions));
        self.controls = FilterControls {
            conditions,
            fuels: table.distinct(CategoricalField::Fuel),
            years: table.year_bounds().unwrap_or_default(),
        };
        self.table = Some(table);
        self.status_message = None;
    }

    /// Build the filter specification for this frame from the controls.
    pub fn filter_spec(&self) -> Result<FilterSpec> {
        let (from, to) = self.controls.years;
        let spec = FilterSpec::new()
            .with_categories(CategoricalField::Condition, self.controls.conditions.iter().cloned())
            .with_categories(CategoricalField::Fuel, self.controls.fuels.iter().cloned())
            .with_range(NumericField::ModelYear, f64::from(from), f64::from(to))
            .context("building filters from the sidebar")?;
        Ok(spec)
    }

    /// Number of listings the current controls let through, `None` without a
    /// table or when the controls do not form a valid filter.
    pub fn visible_count(&self) -> Option<usize> {
        let table = self.table.as_ref()?;
        let spec = self.filter_spec().ok()?;
        evaluate(table, &spec).ok().map(|outcome| outcome.visible())
    }

    /// Toggle a single value of the condition or fuel selection.
    pub fn toggle_value(&mut self, field: CategoricalField, value: &str) {
        let Some(selected) = self.selection_mut(field) else {
            return;
        };
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, field: CategoricalField) {
        let all = match &self.table {
            Some(table) => table.distinct(field),
            None => return,
        };
        if let Some(selected) = self.selection_mut(field) {
            *selected = all;
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, field: CategoricalField) {
        if let Some(selected) = self.selection_mut(field) {
            selected.clear();
        }
    }

    /// Move the lower year bound, dragging the upper one along if needed.
    pub fn set_year_from(&mut self, year: i32) {
        self.controls.years.0 = year;
        self.controls.years.1 = self.controls.years.1.max(year);
    }

    /// Move the upper year bound, dragging the lower one along if needed.
    pub fn set_year_to(&mut self, year: i32) {
        self.controls.years.1 = year;
        self.controls.years.0 = self.controls.years.0.min(year);
    }

    pub fn selection(&self, field: CategoricalField) -> Option<&BTreeSet<String>> {
        match field {
            CategoricalField::Condition => Some(&self.controls.conditions),
            CategoricalField::Fuel => Some(&self.controls.fuels),
            CategoricalField::Model | CategoricalField::Type => None,
        }
    }

    fn selection_mut(&mut self, field: CategoricalField) -> Option<&mut BTreeSet<String>> {
        match field {
            CategoricalField::Condition => Some(&mut self.controls.conditions),
            CategoricalField::Fuel => Some(&mut self.controls.fuels),
            CategoricalField::Model | CategoricalField::Type => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dashboard::{evaluate, Outcome};
    use crate::data::fixtures::lot;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_table(lot());
        state
    }

    #[test]
    fn test_set_table_selects_everything() {
        let state = loaded();
        assert_eq!(state.controls.years, (2010, 2019));
        assert_eq!(state.controls.conditions.len(), 4);
        assert_eq!(state.controls.fuels.len(), 3);

        let table = state.table.as_ref().unwrap();
        let spec = state.filter_spec().unwrap();
        assert_eq!(spec, FilterSpec::defaults_for(table));
        assert_eq!(evaluate(table, &spec).unwrap().visible(), table.len());
    }

    #[test]
    fn test_toggle_and_select_none() {
        let mut state = loaded();
        state.toggle_value(CategoricalField::Fuel, "gas");
        assert!(!state.controls.fuels.contains("gas"));
        state.toggle_value(CategoricalField::Fuel, "gas");
        assert!(state.controls.fuels.contains("gas"));

        state.select_none(CategoricalField::Fuel);
        let table = state.table.as_ref().unwrap();
        let outcome = evaluate(table, &state.filter_spec().unwrap()).unwrap();
        assert!(matches!(outcome, Outcome::NoData));

        state.select_all(CategoricalField::Fuel);
        assert_eq!(state.controls.fuels.len(), 3);
    }

    #[test]
    fn test_visible_count_follows_controls() {
        assert_eq!(AppState::default().visible_count(), None);

        let mut state = loaded();
        let total = state.table.as_ref().unwrap().len();
        assert_eq!(state.visible_count(), Some(total));

        state.select_none(CategoricalField::Condition);
        assert_eq!(state.visible_count(), Some(0));

        state.select_all(CategoricalField::Condition);
        state.set_year_from(2019);
        let expected = state
            .table
            .as_ref()
            .unwrap()
            .records()
            .iter()
            .filter(|r| r.model_year == 2019)
            .count();
        assert_eq!(state.visible_count(), Some(expected));
        assert!(expected < total);
    }

    #[test]
    fn test_year_setters_never_invert() {
        let mut state = loaded();
        state.set_year_from(2018);
        state.set_year_to(2012);
        assert_eq!(state.controls.years, (2012, 2012));
        state.set_year_to(2019);
        state.set_year_from(2019);
        assert_eq!(state.controls.years, (2019, 2019));
        assert!(state.filter_spec().is_ok());
    }

    #[test]
    fn test_open_failure_keeps_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, "price,odometer\n1,2\n").unwrap();

        let mut state = loaded();
        state.open(&path);
        assert!(state.table.is_none());
        let msg = state.status_message.unwrap();
        assert!(msg.contains("Missing required column"), "{msg}");
    }
}
