//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;

pub use app::{ScatterApp, MIN_WINDOW_SIZE};
pub use chart_viewer::ChartViewer;
pub use control_panel::{ControlPanel, ControlPanelAction};
