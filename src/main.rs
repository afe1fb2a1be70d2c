//! Population Scatter - interactive density vs. growth scatterplot
//!
//! Loads a population CSV and plots density against growth rate for one
//! year at a time, with bubble size following population.

mod charts;
mod config;
mod data;
mod gui;
mod state;

use config::{ViewerConfig, CONFIG_FILE};
use eframe::egui;
use gui::{ScatterApp, MIN_WINDOW_SIZE};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ViewerConfig::load_or_default(Path::new(CONFIG_FILE));

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 620.0])
            .with_min_inner_size(MIN_WINDOW_SIZE)
            .with_title("Population Scatter"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Population Scatter",
        options,
        Box::new(move |cc| Ok(Box::new(ScatterApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run viewer: {}", e))
}
