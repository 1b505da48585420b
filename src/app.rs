use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color::ACCENT;
use crate::state::AppState;
use crate::ui::{charts, panels, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub state: AppState,
}

impl ExplorerApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: footer ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.label(RichText::new("Used Cars Explorer · cleaned used car listings").weak());
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            report(ui, &self.state);
        });
    }
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
    ui.separator();
}

fn report(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("Used Cars Explorer").size(28.0).color(ACCENT));
        ui.label("Analyze, filter & visualize the cleaned dataset");
    });
    ui.separator();

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file to start  (File → Open…)");
        });
        return;
    }

    let report = &state.report;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            section(ui, "Preview of Filtered Data");
            tables::preview(ui, &state.working, state.config.preview_rows);

            section(ui, "Summary Statistics");
            ui.push_id("summary", |ui: &mut Ui| tables::summary(ui, &report.summary));

            section(ui, "Price Distribution");
            charts::price_histogram(ui, &report.price_histogram);

            section(ui, "Price by Vehicle Type");
            charts::price_by_vehicle_type(ui, &report.price_by_vehicle_type);

            section(ui, "Price vs. Car Age (colored by gearbox, sized by powerPS)");
            charts::price_vs_age(ui, &report.price_vs_age);

            section(ui, "Most Common Car Models");
            charts::top_models(ui, &report.top_models);

            section(ui, "Fuel Type Distribution");
            charts::fuel_share(ui, &report.fuel_share);
        });
}
