use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::ALL_BRANDS;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            brand_selector(ui, state);
            ui.add_space(8.0);
            fuel_selector(ui, state);
            ui.add_space(8.0);
            age_selector(ui, state);
            ui.add_space(12.0);

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

fn brand_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Select Brand");
    let current = state
        .criteria
        .brand
        .clone()
        .unwrap_or_else(|| ALL_BRANDS.to_string());

    let mut chosen: Option<String> = None;
    egui::ComboBox::from_id_salt("brand")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for brand in &state.brand_options {
                if ui.selectable_label(current == *brand, brand).clicked() {
                    chosen = Some(brand.clone());
                }
            }
        });

    if let Some(brand) = chosen {
        state.set_brand(&brand);
    }
}

fn fuel_selector(ui: &mut Ui, state: &mut AppState) {
    let n_selected = state.criteria.fuel_types.len();
    let n_total = state.fuel_options.len();
    let header_text = format!("Select Fuel Type(s)  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("fuel_types")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_fuel_types();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_fuel_types();
                }
            });

            let options: Vec<String> = state.fuel_options.iter().cloned().collect();
            for fuel in &options {
                let mut checked = state.criteria.fuel_types.contains(fuel);
                if ui.checkbox(&mut checked, fuel.as_str()).changed() {
                    state.toggle_fuel_type(fuel);
                }
            }
        });
}

/// Two independent sliders. Dragging one past the other moves both to the
/// dragged value; the other slider shows the snap on the next frame.
fn age_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Select Car Age");
    let (min, max) = state.age_limits;
    let (mut lo, mut hi) = state.criteria.age_range;

    let from = ui.add(egui::Slider::new(&mut lo, min..=max).text("from"));
    let to = ui.add(egui::Slider::new(&mut hi, min..=max).text("to"));
    if from.changed() || to.changed() {
        state.set_age_range(lo, hi);
    }
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
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                // Failures land in the status line.
                let _ = state.reload();
                ui.close_menu();
            }
            if ui.button("Clear cache").clicked() {
                state.clear_cache();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(source)) = (&state.dataset, &state.source) {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} listings loaded, {} after filters",
                ds.len(),
                state.working.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open used car listings")
        .add_filter("Supported files", &["csv", "zip", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Zipped CSV", &["zip"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        // Failures land in the status line.
        let _ = state.open(&path);
    }
}
