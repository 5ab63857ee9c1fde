use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::filter::FilteredView;
use crate::data::loader::REQUIRED_COLUMNS;
use crate::data::model::{Record, Table, UNKNOWN_LABEL};
use crate::ui::thousands;

/// Rows shown in the data preview above the charts.
pub const PREVIEW_ROWS: usize = 5;

const ROW_HEIGHT: f32 = 18.0;

/// The first [`PREVIEW_ROWS`] listings of the unfiltered table.
pub fn preview(ui: &mut Ui, table: &Table) {
    let rows = &table.records()[..table.len().min(PREVIEW_ROWS)];
    records_table(ui, "preview_table", rows.len(), 160.0, |i| rows.get(i));
}

/// Every listing of a filtered view.
pub fn listings(ui: &mut Ui, view: &FilteredView<'_>) {
    records_table(ui, "listings_table", view.len(), 400.0, |i| view.get(i));
}

fn records_table<'r>(
    ui: &mut Ui,
    id: &str,
    n_rows: usize,
    max_height: f32,
    row_at: impl Fn(usize) -> Option<&'r Record>,
) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .max_scroll_height(max_height)
            .columns(Column::auto().at_least(70.0), REQUIRED_COLUMNS.len())
            .header(20.0, |mut header| {
                for name in REQUIRED_COLUMNS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, n_rows, |mut row| {
                    let Some(rec) = row_at(row.index()) else {
                        return;
                    };
                    for cell in cells(rec) {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

/// Display text of each column, in [`REQUIRED_COLUMNS`] order.
fn cells(rec: &Record) -> [String; 7] {
    [
        rec.model_year.to_string(),
        thousands(rec.odometer),
        format!("${}", thousands(rec.price)),
        rec.condition.clone(),
        rec.fuel.clone(),
        rec.model.as_deref().unwrap_or(UNKNOWN_LABEL).to_string(),
        rec.vehicle_type.as_deref().unwrap_or(UNKNOWN_LABEL).to_string(),
    ]
}
