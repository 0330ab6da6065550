use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::aggregate::Granularity;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let categories: Vec<String> = dataset.categories.iter().cloned().collect();
    let regions: Vec<String> = dataset.regions.iter().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Order date range");
            let mut changed = false;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("From");
                changed |= ui
                    .add(DatePickerButton::new(&mut state.start_date).id_salt("start_date"))
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("To");
                changed |= ui
                    .add(DatePickerButton::new(&mut state.end_date).id_salt("end_date"))
                    .changed();
            });
            if state.start_date > state.end_date {
                ui.label(
                    RichText::new("Start is after end: no orders match.")
                        .color(Color32::YELLOW)
                        .small(),
                );
            }
            if changed {
                state.refilter();
            }
            ui.separator();

            // ---- Checkbox groups ----
            checkbox_group(ui, state, "Category", &categories, GroupKind::Category);
            checkbox_group(ui, state, "Region", &regions, GroupKind::Region);
            ui.separator();

            // ---- Trend granularity ----
            ui.strong("Trend granularity");
            let mut granularity = state.granularity;
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut granularity, Granularity::Monthly, "Monthly");
                ui.radio_value(&mut granularity, Granularity::Daily, "Daily");
            });
            state.set_granularity(granularity);
            ui.separator();

            // ---- Chart toggles ----
            ui.strong("Show/Hide charts");
            ui.checkbox(&mut state.show_category_chart, "Sales by Category");
            ui.checkbox(&mut state.show_region_chart, "Profit by Region");
            ui.checkbox(&mut state.show_discount_chart, "Discount by Category");
            ui.separator();

            // ---- Feedback ----
            ui.strong("Feedback");
            ui.text_edit_multiline(&mut state.feedback_draft);
            if ui.button("Submit Feedback").clicked() {
                state.submit_feedback();
            }
            feedback_entries(ui, state);
        });
}

#[derive(Clone, Copy)]
enum GroupKind {
    Category,
    Region,
}

/// A collapsible checkbox group with All/None shortcuts, one checkbox per
/// distinct value.
fn checkbox_group(
    ui: &mut Ui,
    state: &mut AppState,
    title: &str,
    values: &[String],
    kind: GroupKind,
) {
    let selected: &BTreeSet<String> = match kind {
        GroupKind::Category => &state.selected_categories,
        GroupKind::Region => &state.selected_regions,
    };
    let header_text = format!("{title}  ({}/{})", selected.len(), values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    match kind {
                        GroupKind::Category => state.select_all_categories(),
                        GroupKind::Region => state.select_all_regions(),
                    }
                }
                if ui.small_button("None").clicked() {
                    match kind {
                        GroupKind::Category => state.select_no_categories(),
                        GroupKind::Region => state.select_no_regions(),
                    }
                }
            });

            for value in values {
                let is_selected = match kind {
                    GroupKind::Category => state.selected_categories.contains(value),
                    GroupKind::Region => state.selected_regions.contains(value),
                };

                // Color swatch for categories so checkboxes match the charts.
                let mut text = RichText::new(value);
                if matches!(kind, GroupKind::Category) {
                    text = text.color(state.colors.color_for(value));
                }

                let mut checked = is_selected;
                if ui.checkbox(&mut checked, text).changed() {
                    match kind {
                        GroupKind::Category => state.toggle_category(value),
                        GroupKind::Region => state.toggle_region(value),
                    }
                }
            }
        });
}

/// Collapsible list of previously submitted feedback. The log is only read
/// while the header is open.
fn feedback_entries(ui: &mut Ui, state: &AppState) {
    egui::CollapsingHeader::new("View submitted feedback")
        .id_salt("feedback_entries")
        .default_open(false)
        .show(ui, |ui: &mut Ui| match state.feedback.entries() {
            Ok(entries) if entries.is_empty() => {
                ui.label("No feedback submitted yet.");
            }
            Ok(entries) => {
                for (timestamp, text) in entries {
                    ui.label(RichText::new(timestamp).small().weak());
                    ui.label(text);
                    ui.separator();
                }
            }
            Err(e) => {
                ui.label(RichText::new(format!("Error: {e:#}")).color(Color32::RED));
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
            if ui.button("Export filtered CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} orders loaded, {} match filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open order data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} orders ({} categories, {} regions)",
                    dataset.len(),
                    dataset.categories.len(),
                    dataset.regions.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("filtered_orders.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_csv(&path) {
            Ok(()) => {
                log::info!("Exported {} rows to {}", state.visible_indices.len(), path.display());
                state.status_message = Some(format!(
                    "Exported {} rows to {}",
                    state.visible_indices.len(),
                    path.display()
                ));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export error: {e:#}"));
            }
        }
    }
}
