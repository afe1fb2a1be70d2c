//! Population Scatter Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{ExportFormat, StaticChartRenderer};
use crate::config::ViewerConfig;
use crate::data::{DataLoader, LoadHandle, LoadMessage};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::state::{ViewEvent, ViewState};
use egui::SidePanel;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Widest the control panel may grow.
pub const SIDE_PANEL_MAX_WIDTH: f32 = 320.0;
/// Smallest window that still fits the side panel beside a default-sized chart.
pub const MIN_WINDOW_SIZE: [f32; 2] = [960.0, 560.0];

/// Main application window.
pub struct ScatterApp {
    state: ViewState,
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading; dropping the handle cancels the load.
    load: Option<LoadHandle>,
}

impl ScatterApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        let mut app = Self {
            state: ViewState::new(config.default_year.clone(), config.layout),
            loader: DataLoader::new(config.column_layout),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load: None,
        };
        app.start_load(config.data_path);
        app
    }

    /// Begin loading `path`, superseding any load in flight.
    fn start_load(&mut self, path: PathBuf) {
        self.load = Some(self.loader.spawn(path));
        self.state.apply(ViewEvent::LoadStarted);
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    fn handle_reload(&mut self) {
        if let Some(path) = self.loader.file_path().map(|p| p.to_path_buf()) {
            self.start_load(path);
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(handle) = self.load.take() else {
            return;
        };

        let mut should_keep_handle = true;
        for message in handle.poll() {
            let event = match message {
                LoadMessage::Retrying { attempt, error } => {
                    ViewEvent::LoadRetrying { attempt, error }
                }
                LoadMessage::Complete(parsed) => {
                    should_keep_handle = false;
                    ViewEvent::DataLoaded(parsed)
                }
                LoadMessage::Failed(error) => {
                    should_keep_handle = false;
                    ViewEvent::LoadFailed(error)
                }
            };
            debug!(generation = handle.generation(), "Load event: {:?}", event);
            self.state.apply(event);
        }

        if should_keep_handle {
            self.load = Some(handle);
        }
    }

    /// Ask for a destination and write the current scene there.
    fn handle_export(&mut self, format: ExportFormat) {
        let (label, ext) = match format {
            ExportFormat::Svg => ("SVG Image", "svg"),
            ExportFormat::Png => ("PNG Image", "png"),
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter(label, &[ext])
            .set_file_name(format!("population_{}.{}", self.state.selected_year(), ext))
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match StaticChartRenderer::export(self.state.scene(), &output_path) {
            Ok(_) => {
                self.control_panel
                    .set_export_result(format!("Exported {}", output_path.display()), false);
                if let Err(e) = open::that(&output_path) {
                    warn!("Could not open exported chart: {}", e);
                }
            }
            Err(e) => {
                warn!("Export failed: {}", e);
                self.control_panel.set_export_result(format!("Error: {}", e), true);
            }
        }
    }
}

impl eframe::App for ScatterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        let now = ctx.input(|i| i.time);
        if self.state.status.is_busy() || self.state.tooltip.is_fading(now) {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(SIDE_PANEL_MAX_WIDTH)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self
                        .control_panel
                        .show(ui, &self.state, self.loader.file_path());

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::YearSelected(year) => {
                            self.state.apply(ViewEvent::YearSelected(year))
                        }
                        ControlPanelAction::ExportSvg => self.handle_export(ExportFormat::Svg),
                        ControlPanelAction::ExportPng => self.handle_export(ExportFormat::Png),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let events = self.chart_viewer.show(ui, &self.state);
            if !events.is_empty() {
                ctx.request_repaint();
            }
            for event in events {
                self.state.apply(event);
            }
        });
    }
}
