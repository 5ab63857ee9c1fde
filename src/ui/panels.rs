use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::CategoricalField;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let table = match &state.table {
        Some(table) => table,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Copy the option lists so we can mutate state inside the loop.
    let conditions = table.distinct(CategoricalField::Condition);
    let fuels = table.distinct(CategoricalField::Fuel);
    let year_bounds = table.year_bounds();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multi_select(ui, state, CategoricalField::Condition, "Condition", &conditions);
            multi_select(ui, state, CategoricalField::Fuel, "Fuel type", &fuels);
            ui.separator();

            if let Some((min, max)) = year_bounds {
                ui.strong("Model year");
                let (mut from, mut to) = state.controls.years;
                if ui
                    .add(egui::Slider::new(&mut from, min..=max).text("from"))
                    .changed()
                {
                    state.set_year_from(from);
                }
                if ui
                    .add(egui::Slider::new(&mut to, min..=max).text("to"))
                    .changed()
                {
                    state.set_year_to(to);
                }
            }
        });
}

/// Collapsible checkbox list over every value of a column.
fn multi_select(
    ui: &mut Ui,
    state: &mut AppState,
    field: CategoricalField,
    title: &str,
    options: &BTreeSet<String>,
) {
    // Show count of selected / total in the header
    let n_selected = state.selection(field).map_or(0, |s| s.len());
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(field.name())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(field);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(field);
                }
            });

            for val in options {
                let mut checked = state.selection(field).is_some_and(|s| s.contains(val));

                // Conditions are shown in their scatter-plot colour.
                let mut text = RichText::new(val);
                if field == CategoricalField::Condition {
                    if let Some(cm) = &state.condition_colors {
                        text = text.color(cm.color_for(Some(val)));
                    }
                }

                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_value(field, val);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let source = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let visible = state.visible_count().unwrap_or(0);
            ui.label(format!(
                "{source}: {} listings loaded, {visible} visible",
                table.len()
            ));
            if table.dropped_rows() > 0 {
                ui.weak(format!("({} incomplete rows dropped)", table.dropped_rows()));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open car listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
