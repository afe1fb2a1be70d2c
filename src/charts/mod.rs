//! Charts module - Scales, scene building and static rendering

mod renderer;
mod scale;
mod scatter;
mod scene;

pub use renderer::{ExportFormat, StaticChartRenderer};
pub use scatter::render_scatterplot;
pub use scene::{AxisOrient, PlotLayout, Point, Scene};
