//! Static Chart Renderer
//! Writes a `Scene` to disk as SVG, or rasterizes it to PNG with plotters.

use crate::charts::scene::{Axis, AxisOrient, Point, Scene, TICK_FONT_SIZE, TITLE_FONT_SIZE};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("Cannot allocate a pixel buffer for {0}x{1}")]
    Buffer(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "png" => Ok(ExportFormat::Png),
            _ => Err(ExportError::UnsupportedFormat(ext)),
        }
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Write the scene to `path`, choosing SVG or PNG by extension.
    pub fn export(scene: &Scene, path: &Path) -> Result<ExportFormat, ExportError> {
        let format = ExportFormat::from_path(path)?;
        let bytes = match format {
            ExportFormat::Svg => scene.to_svg().into_bytes(),
            ExportFormat::Png => Self::render_png_bytes(scene)?,
        };
        std::fs::write(path, bytes).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), ?format, "Chart exported");
        Ok(format)
    }

    /// Rasterize the scene and encode it as PNG.
    pub fn render_png_bytes(scene: &Scene) -> Result<Vec<u8>, ExportError> {
        let img = Self::render_rgb(scene)?;
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Rasterize the scene onto a white background.
    pub fn render_rgb(scene: &Scene) -> Result<RgbImage, ExportError> {
        let width = scene.width().round().max(1.0) as u32;
        let height = scene.height().round().max(1.0) as u32;
        let len = Self::rgb_buffer_len(width, height).ok_or(ExportError::Buffer(width, height))?;
        let mut buffer = vec![0u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| ExportError::Draw(e.to_string()))?;
            Self::draw_scene(&root, scene).map_err(|e| ExportError::Draw(e.to_string()))?;
            root.present()
                .map_err(|e| ExportError::Draw(e.to_string()))?;
        }
        RgbImage::from_raw(width, height, buffer).ok_or(ExportError::Buffer(width, height))
    }

    /// Bytes needed for an RGB image, or `None` if it overflows.
    fn rgb_buffer_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(3)
    }

    /// Draw axes and circles onto any plotters backend.
    pub fn draw_scene<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        scene: &Scene,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let origin = scene.origin();

        for axis in [&scene.x_axis, &scene.y_axis] {
            Self::draw_axis(area, axis, origin)?;
        }

        for circle in &scene.circles {
            let (r, g, b) = circle.fill.rgb();
            area.draw(&Circle::new(
                to_pixel(origin, circle.center),
                circle.radius.round() as i32,
                RGBColor(r, g, b).filled(),
            ))?;
        }
        Ok(())
    }

    fn draw_axis<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        axis: &Axis,
        origin: Point,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let domain: Vec<(i32, i32)> = axis
            .domain_path()
            .into_iter()
            .map(|p| to_pixel(origin, p))
            .collect();
        area.draw(&PathElement::new(domain, BLACK))?;

        let label_pos = match axis.orient {
            AxisOrient::Bottom => Pos::new(HPos::Center, VPos::Top),
            AxisOrient::Left => Pos::new(HPos::Right, VPos::Center),
        };
        let label_style = ("sans-serif", TICK_FONT_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(label_pos);

        for tick in &axis.ticks {
            let (a, b) = axis.tick_line(tick);
            area.draw(&PathElement::new(
                vec![to_pixel(origin, a), to_pixel(origin, b)],
                BLACK,
            ))?;
            if !tick.label.is_empty() {
                area.draw(&Text::new(
                    tick.label.clone(),
                    to_pixel(origin, axis.tick_label_anchor(tick)),
                    label_style.clone(),
                ))?;
            }
        }

        if !axis.title.text.is_empty() {
            let mut font = ("sans-serif", TITLE_FONT_SIZE)
                .into_font()
                .style(FontStyle::Bold);
            if axis.title.rotated {
                font = font.transform(FontTransform::Rotate270);
            }
            let style = font.color(&BLACK).pos(Pos::new(HPos::Center, VPos::Bottom));
            area.draw(&Text::new(
                axis.title.text.clone(),
                to_pixel(origin, axis.title_anchor()),
                style,
            ))?;
        }
        Ok(())
    }
}

fn to_pixel(origin: Point, p: Point) -> (i32, i32) {
    (
        (origin.x + p.x).round() as i32,
        (origin.y + p.y).round() as i32,
    )
}
