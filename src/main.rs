mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::ExplorerApp;
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

/// Explore a cleaned used-car listings dataset.
#[derive(Debug, Parser)]
#[command(name = "used-cars-explorer", version, about)]
struct Cli {
    /// Listings file (.csv, .zip with one CSV member, or .parquet).
    data: Option<PathBuf>,

    /// JSON settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Year car ages are measured against.
    #[arg(long)]
    reference_year: Option<i32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(year) = cli.reference_year {
        config.reference_year = year;
    }
    if let Some(path) = cli.data {
        config.data_path = Some(path);
    }

    let mut state = AppState::new(config);
    if let Some(path) = state.config.data_path.clone() {
        // A failed start-up load stays visible in the status line.
        let _ = state.open(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Used Cars Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(ExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the explorer window")
}
