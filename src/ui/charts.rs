use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::aggregate::{compare_labels, GroupAggregate, GroupBox, HistogramBin};
use crate::data::dashboard::{evaluate, Outcome, Report};
use crate::data::filter::FilteredView;
use crate::data::model::UNKNOWN_LABEL;
use crate::state::{AppState, ChartToggles};
use crate::ui::{table, thousands};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the preview, metrics, charts, and listings table.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let spec = state.filter_spec();
    let AppState {
        table,
        charts,
        condition_colors,
        ..
    } = state;

    let Some(table) = table.as_ref() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file to start  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Used car listings");
            ui.add_space(4.0);
            ui.strong("Data preview");
            table::preview(ui, table);
            ui.separator();

            let outcome = spec.and_then(|spec| Ok(evaluate(table, &spec)?));
            match outcome {
                Ok(Outcome::HasData(report)) => {
                    report_view(ui, charts, condition_colors.as_ref(), &report);
                }
                Ok(Outcome::NoData) => {
                    ui.label(
                        RichText::new("No listings match the selected filters.")
                            .color(Color32::from_rgb(230, 160, 40))
                            .strong(),
                    );
                }
                Err(e) => {
                    log::error!("Filter evaluation failed: {e:#}");
                    ui.label(RichText::new(format!("Error: {e:#}")).color(Color32::RED));
                }
            }
        });
}

fn report_view(ui: &mut Ui, charts: &mut ChartToggles, colors: Option<&ColorMap>, report: &Report<'_>) {
    ui.heading("Overview");
    let m = &report.metrics;
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Average price", format!("${}", thousands(m.mean_price)));
        metric(&mut cols[1], "Average odometer", format!("{} km", thousands(m.mean_odometer)));
        metric(&mut cols[2], "Listings", m.count.to_string());
    });
    ui.separator();

    ui.heading("Charts");
    ui.horizontal(|ui: &mut Ui| {
        ui.checkbox(&mut charts.histogram, "Histogram");
        ui.checkbox(&mut charts.scatter, "Scatter");
        ui.checkbox(&mut charts.bars, "Bars by type");
        ui.checkbox(&mut charts.box_plot, "Box plot by condition");
    });
    ui.separator();

    if charts.histogram {
        ui.strong("Odometer histogram");
        odometer_histogram(ui, &report.odometer_histogram);
    }
    if charts.scatter {
        ui.strong("Price vs model year");
        price_scatter(ui, &report.view, colors);
    }
    if charts.bars {
        ui.strong("Listings per type");
        type_bars(ui, &report.by_type);
    }
    if charts.box_plot {
        ui.strong("Price distribution by condition");
        price_box_plot(ui, &report.price_by_condition);
    }

    egui::CollapsingHeader::new("Show all filtered listings")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            table::listings(ui, &report.view);
        });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(value).size(24.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn odometer_histogram(ui: &mut Ui, bins: &[HistogramBin]) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| Bar::new(b.center(), b.count as f64).width(b.width().max(1.0)))
        .collect();

    Plot::new("odometer_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("odometer")
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("listings"));
        });
}

/// One point series per condition, so the legend doubles as a colour key.
fn price_scatter(ui: &mut Ui, view: &FilteredView<'_>, colors: Option<&ColorMap>) {
    let mut series: Vec<(&str, Vec<[f64; 2]>)> = Vec::new();
    for rec in view.records() {
        let key = rec.condition.as_str();
        let point = [f64::from(rec.model_year), rec.price];
        match series.iter_mut().find(|(k, _)| *k == key) {
            Some((_, points)) => points.push(point),
            None => series.push((key, vec![point])),
        }
    }
    series.sort_by(|a, b| a.0.cmp(b.0));

    Plot::new("price_scatter")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("model_year")
        .y_axis_label("price")
        .allow_scroll(false)
        .label_formatter(|name, value| {
            // Hovering a point: show the listing behind it.
            let hit = view.records().find(|r| {
                r.condition == name && f64::from(r.model_year) == value.x && r.price == value.y
            });
            match hit {
                Some(r) => format!(
                    "{name}\n{} {}, {}\n${}",
                    r.model_year,
                    r.model.as_deref().unwrap_or(UNKNOWN_LABEL),
                    r.vehicle_type.as_deref().unwrap_or(UNKNOWN_LABEL),
                    thousands(r.price)
                ),
                None => format!("year {:.0}\nprice ${}", value.x, thousands(value.y)),
            }
        })
        .show(ui, |plot_ui| {
            for (key, points) in series {
                let color = colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(Some(key)));
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(key)
                        .color(color)
                        .radius(2.5),
                );
            }
        });
}

fn type_bars(ui: &mut Ui, counts: &GroupAggregate) {
    let sorted = counts.clone().sorted_by_count();
    let labels: Vec<String> = sorted.entries().iter().map(|e| e.label().to_string()).collect();
    let bars: Vec<Bar> = sorted
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| Bar::new(i as f64, e.count as f64).name(e.label()).width(0.7))
        .collect();

    Plot::new("type_bars")
        .height(CHART_HEIGHT)
        .y_axis_label("count")
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| category_tick(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("listings"));
        });
}

fn price_box_plot(ui: &mut Ui, boxes: &[GroupBox]) {
    let mut sorted: Vec<&GroupBox> = boxes.iter().collect();
    sorted.sort_by(|a, b| compare_labels(a.value.as_deref(), b.value.as_deref()));

    let labels: Vec<String> = sorted.iter().map(|g| g.label().to_string()).collect();
    let elems: Vec<BoxElem> = sorted
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let s = &g.summary;
            BoxElem::new(
                i as f64,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(g.label())
            .box_width(0.6)
        })
        .collect();
    let outliers: Vec<[f64; 2]> = sorted
        .iter()
        .enumerate()
        .flat_map(|(i, g)| g.summary.outliers.iter().map(move |&v| [i as f64, v]))
        .collect();

    Plot::new("price_box_plot")
        .height(CHART_HEIGHT)
        .y_axis_label("price")
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| category_tick(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems).name("price"));
            plot_ui.points(
                Points::new(PlotPoints::from(outliers))
                    .name("outliers")
                    .color(Color32::GRAY)
                    .radius(1.5),
            );
        });
}

/// Axis label for a categorical chart: only whole positions get a name.
fn category_tick(labels: &[String], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::category_tick;

    #[test]
    fn test_category_tick() {
        let labels = vec!["sedan".to_string(), "suv".to_string()];
        assert_eq!(category_tick(&labels, 0.0), "sedan");
        assert_eq!(category_tick(&labels, 1.0), "suv");
        assert_eq!(category_tick(&labels, 0.5), "");
        assert_eq!(category_tick(&labels, 2.0), "");
        assert_eq!(category_tick(&labels, -1.0), "");
    }
}
