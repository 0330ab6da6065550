use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::data::aggregate::Granularity;
use crate::data::model::{OrderRecord, SCHEMA_COLUMNS};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel: KPI strip + chart grid
// ---------------------------------------------------------------------------

/// Render the dashboard in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(_dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a dataset to explore sales  (File → Open…)");
        });
        return;
    };

    if state.selection_incomplete() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(
                RichText::new("Select at least one category and one region to proceed.")
                    .color(Color32::YELLOW),
            );
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_strip(ui, state);
            ui.separator();

            raw_data_table(ui, state);

            if state.visible_indices.is_empty() {
                ui.add_space(24.0);
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.heading("No data for this selection.");
                    ui.label("Widen the date range or select more categories/regions.");
                });
                return;
            }

            trend_chart(ui, state);

            if state.show_category_chart {
                ui.add_space(8.0);
                sales_by_category_chart(ui, state);
            }
            if state.show_region_chart {
                ui.add_space(8.0);
                profit_by_region_chart(ui, state);
            }
            if state.show_discount_chart {
                ui.add_space(8.0);
                discount_by_category_chart(ui, state);
            }
        });
}

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

/// Cell text for one table row, in schema column order.
fn row_cells(order: &OrderRecord) -> [String; 6] {
    [
        order.category.clone(),
        order.region.clone(),
        order.order_date.format("%Y-%m-%d").to_string(),
        format!("{:.2}", order.sales),
        format!("{:.2}", order.profit),
        format!("{:.2}", order.discount),
    ]
}

/// Collapsible table of the filtered rows, virtual-scrolled so large
/// selections stay cheap to render.
fn raw_data_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };

    egui::CollapsingHeader::new("Show Raw Data")
        .id_salt("raw_data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(260.0)
                .columns(Column::auto().resizable(true), SCHEMA_COLUMNS.len())
                .header(20.0, |mut header| {
                    for col in SCHEMA_COLUMNS {
                        header.col(|ui: &mut Ui| {
                            ui.strong(col);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, state.visible_indices.len(), |mut row| {
                        let order = &ds.orders[state.visible_indices[row.index()]];
                        for cell in row_cells(order) {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

/// Four KPI cards: filtered value plus delta against the whole dataset.
fn kpi_strip(ui: &mut Ui, state: &AppState) {
    let kpis = &state.kpis;
    let overall = &state.overall_kpis;

    ui.columns(4, |cols: &mut [Ui]| {
        kpi_card(
            &mut cols[0],
            "Total Sales",
            format!("${:.2}", kpis.total_sales),
            percent_delta(kpis.total_sales, overall.total_sales),
        );
        kpi_card(
            &mut cols[1],
            "Total Profit",
            format!("${:.2}", kpis.total_profit),
            percent_delta(kpis.total_profit, overall.total_profit),
        );
        kpi_card(
            &mut cols[2],
            "Orders",
            kpis.order_count.to_string(),
            percent_delta(kpis.order_count as f64, overall.order_count as f64),
        );
        kpi_card(
            &mut cols[3],
            "Avg Discount",
            format!("{:.1}%", kpis.avg_discount * 100.0),
            None,
        );
    });
}

/// Filtered-vs-overall change in percent; None when the baseline is zero.
fn percent_delta(filtered: f64, overall: f64) -> Option<f64> {
    if overall == 0.0 {
        return None;
    }
    Some((filtered - overall) / overall * 100.0)
}

fn kpi_card(ui: &mut Ui, title: &str, value: String, delta: Option<f64>) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(title).small());
        ui.label(RichText::new(value).heading().strong());
        if let Some(d) = delta {
            let color = if d < 0.0 {
                Color32::LIGHT_RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(format!("{d:+.2}% vs overall")).small().color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Trend chart
// ---------------------------------------------------------------------------

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_label(x: f64, granularity: Granularity) -> String {
    match NaiveDate::from_num_days_from_ce_opt(x.round() as i32) {
        Some(date) => match granularity {
            Granularity::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Daily => date.format("%Y-%m-%d").to_string(),
        },
        None => String::new(),
    }
}

/// Sales and profit over time at the selected granularity.
fn trend_chart(ui: &mut Ui, state: &AppState) {
    ui.strong(match state.granularity {
        Granularity::Monthly => "Monthly Sales & Profit Trend",
        Granularity::Daily => "Daily Sales & Profit Trend",
    });

    let sales_points: PlotPoints = state
        .trend
        .iter()
        .map(|p| [date_to_x(p.date), p.sales])
        .collect();
    let profit_points: PlotPoints = state
        .trend
        .iter()
        .map(|p| [date_to_x(p.date), p.profit])
        .collect();

    let granularity = state.granularity;
    Plot::new("trend_chart")
        .legend(Legend::default())
        .height(240.0)
        .y_axis_label("Amount ($)")
        .x_axis_formatter(move |mark, _range| x_to_label(mark.value, granularity))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(sales_points)
                    .name("Sales")
                    .color(Color32::from_rgb(30, 144, 255))
                    .width(1.5),
            );
            plot_ui.line(
                Line::new(profit_points)
                    .name("Profit")
                    .color(Color32::from_rgb(250, 128, 114))
                    .width(1.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// A horizontal-axis bar chart over string keys, one bar per key.
fn keyed_bar_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    y_label: &str,
    entries: Vec<(String, f64, Color32)>,
) {
    ui.strong(title);

    let labels: Vec<String> = entries.iter().map(|(k, _, _)| k.clone()).collect();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (key, value, color))| {
            Bar::new(i as f64, *value)
                .width(0.6)
                .name(key)
                .fill(*color)
        })
        .collect();

    Plot::new(id.to_string())
        .legend(Legend::default())
        .height(200.0)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if i >= 0 && (i as usize) < labels.len() && (mark.value - i as f64).abs() < 1e-6 {
                labels[i as usize].clone()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(title.to_string()));
        });
}

fn sales_by_category_chart(ui: &mut Ui, state: &AppState) {
    let entries: Vec<(String, f64, Color32)> = state
        .groups
        .sales_by_category
        .iter()
        .map(|(cat, &sales)| (cat.clone(), sales, state.colors.color_for(cat)))
        .collect();
    keyed_bar_chart(ui, "sales_by_category", "Sales by Category", "Sales ($)", entries);
}

fn profit_by_region_chart(ui: &mut Ui, state: &AppState) {
    let entries: Vec<(String, f64, Color32)> = state
        .groups
        .avg_profit_by_region
        .iter()
        .map(|(region, &profit)| {
            let color = if profit < 0.0 {
                Color32::LIGHT_RED
            } else {
                Color32::from_rgb(60, 179, 113)
            };
            (region.clone(), profit, color)
        })
        .collect();
    keyed_bar_chart(
        ui,
        "profit_by_region",
        "Average Profit by Region",
        "Profit ($)",
        entries,
    );
}

fn discount_by_category_chart(ui: &mut Ui, state: &AppState) {
    let entries: Vec<(String, f64, Color32)> = state
        .groups
        .avg_discount_by_category
        .iter()
        .map(|(cat, &discount)| (cat.clone(), discount * 100.0, state.colors.color_for(cat)))
        .collect();
    keyed_bar_chart(
        ui,
        "discount_by_category",
        "Average Discount by Category",
        "Discount (%)",
        entries,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_cells_follow_schema_column_order() {
        let order = OrderRecord {
            category: "Furniture".into(),
            region: "East".into(),
            order_date: NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            sales: 100.0,
            profit: 10.5,
            discount: 0.1,
        };

        let cells = row_cells(&order);
        assert_eq!(cells.len(), SCHEMA_COLUMNS.len());
        assert_eq!(
            cells,
            [
                "Furniture".to_string(),
                "East".to_string(),
                "2023-01-05".to_string(),
                "100.00".to_string(),
                "10.50".to_string(),
                "0.10".to_string(),
            ]
        );
    }
}
