//! Scene Module
//! Declarative visual tree for the scatterplot.
//!
//! A `Scene` is plain data: the GUI paints it every frame, the static
//! renderer rasterizes it and `to_svg` serializes it. Coordinates inside the
//! scene are plot-local (origin at the top-left of the plot area, after the
//! margin translation), matching the nested `<g>` of the SVG output.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Axis tick line length in pixels.
pub const TICK_SIZE: f64 = 6.0;
/// Gap between tick line and tick label.
pub const TICK_PADDING: f64 = 3.0;
pub const TICK_FONT_SIZE: f64 = 10.0;
pub const TITLE_FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Circle fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Rgb(u8, u8, u8),
    /// A palette entry with no usable color; drawn in the SVG default (black).
    Unset,
}

impl Fill {
    /// Parse `#RRGGBB`. Anything else is `Unset`.
    pub fn from_hex(hex: &str) -> Self {
        let Some(digits) = hex.strip_prefix('#') else {
            return Fill::Unset;
        };
        if digits.len() != 6 {
            return Fill::Unset;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        match (channel(0), channel(2), channel(4)) {
            (Some(r), Some(g), Some(b)) => Fill::Rgb(r, g, b),
            _ => Fill::Unset,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Fill::Rgb(r, g, b) => (r, g, b),
            Fill::Unset => (0, 0, 0),
        }
    }

    fn svg_attr(self) -> Option<String> {
        match self {
            Fill::Rgb(r, g, b) => Some(format!("#{:02X}{:02X}{:02X}", r, g, b)),
            Fill::Unset => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 70.0,
            left: 70.0,
        }
    }
}

/// Outer size of the chart and the margins around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for PlotLayout {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            margin: Margin::default(),
        }
    }
}

impl PlotLayout {
    pub fn plot_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.margin.left, self.margin.top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Position along the axis, in axis-local pixels.
    pub offset: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTitle {
    pub text: String,
    /// Anchor in axis-local coordinates, before any rotation.
    pub anchor: Point,
    /// Rotated -90 degrees about its anchor.
    pub rotated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub orient: AxisOrient,
    /// Axis group origin in plot-local coordinates.
    pub translate: Point,
    /// Pixel extent of the domain line.
    pub range: (f64, f64),
    pub ticks: Vec<Tick>,
    pub title: AxisTitle,
}

impl Axis {
    /// Domain line as plot-local points, including the outer ticks.
    pub fn domain_path(&self) -> Vec<Point> {
        let (r0, r1) = self.range;
        let t = self.translate;
        match self.orient {
            AxisOrient::Bottom => vec![
                t.offset(r0, TICK_SIZE),
                t.offset(r0, 0.0),
                t.offset(r1, 0.0),
                t.offset(r1, TICK_SIZE),
            ],
            AxisOrient::Left => vec![
                t.offset(-TICK_SIZE, r0),
                t.offset(0.0, r0),
                t.offset(0.0, r1),
                t.offset(-TICK_SIZE, r1),
            ],
        }
    }

    /// Tick line endpoints in plot-local coordinates.
    pub fn tick_line(&self, tick: &Tick) -> (Point, Point) {
        let t = self.translate;
        match self.orient {
            AxisOrient::Bottom => (t.offset(tick.offset, 0.0), t.offset(tick.offset, TICK_SIZE)),
            AxisOrient::Left => (t.offset(0.0, tick.offset), t.offset(-TICK_SIZE, tick.offset)),
        }
    }

    /// Anchor of a tick label in plot-local coordinates.
    pub fn tick_label_anchor(&self, tick: &Tick) -> Point {
        let t = self.translate;
        let gap = TICK_SIZE + TICK_PADDING;
        match self.orient {
            AxisOrient::Bottom => t.offset(tick.offset, gap),
            AxisOrient::Left => t.offset(-gap, tick.offset),
        }
    }

    pub fn title_anchor(&self) -> Point {
        self.translate
            .offset(self.title.anchor.x, self.title.anchor.y)
    }

    fn write_svg(&self, out: &mut String, class: &str) {
        let t = self.translate;
        let (r0, r1) = self.range;
        let text_anchor = match self.orient {
            AxisOrient::Bottom => "middle",
            AxisOrient::Left => "end",
        };
        let _ = writeln!(
            out,
            r#"    <g class="{}" transform="translate({}, {})" fill="none" font-size="{}" font-family="sans-serif" text-anchor="{}">"#,
            class,
            num(t.x),
            num(t.y),
            num(TICK_FONT_SIZE),
            text_anchor
        );

        let domain = match self.orient {
            AxisOrient::Bottom => format!(
                "M{},{}V0H{}V{}",
                num(r0),
                num(TICK_SIZE),
                num(r1),
                num(TICK_SIZE)
            ),
            AxisOrient::Left => format!(
                "M{},{}H0V{}H{}",
                num(-TICK_SIZE),
                num(r0),
                num(r1),
                num(-TICK_SIZE)
            ),
        };
        let _ = writeln!(
            out,
            r#"      <path class="domain" stroke="currentColor" d="{}"/>"#,
            domain
        );

        let gap = TICK_SIZE + TICK_PADDING;
        for tick in &self.ticks {
            let label = escape_xml(&tick.label);
            let _ = match self.orient {
                AxisOrient::Bottom => writeln!(
                    out,
                    r#"      <g class="tick" transform="translate({}, 0)"><line stroke="currentColor" y2="{}"/><text fill="currentColor" y="{}" dy="0.71em">{}</text></g>"#,
                    num(tick.offset),
                    num(TICK_SIZE),
                    num(gap),
                    label
                ),
                AxisOrient::Left => writeln!(
                    out,
                    r#"      <g class="tick" transform="translate(0, {})"><line stroke="currentColor" x2="{}"/><text fill="currentColor" x="{}" dy="0.32em">{}</text></g>"#,
                    num(tick.offset),
                    num(-TICK_SIZE),
                    num(-gap),
                    label
                ),
            };
        }

        let a = self.title.anchor;
        let (x, y, rotate) = if self.title.rotated {
            // Inverse of rotate(-90): (x, y) in the rotated frame is (-y, x).
            (-a.y, a.x, r#" transform="rotate(-90)""#)
        } else {
            (a.x, a.y, "")
        };
        let _ = writeln!(
            out,
            r##"      <text{} x="{}" y="{}" fill="#000" text-anchor="middle" font-family="Arial" font-size="{}px" font-weight="bold">{}</text>"##,
            rotate,
            num(x),
            num(y),
            num(TITLE_FONT_SIZE),
            escape_xml(&self.title.text)
        );
        out.push_str("    </g>\n");
    }
}

/// One bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleMark {
    pub center: Point,
    pub radius: f64,
    pub fill: Fill,
    /// Tooltip text shown while hovered.
    pub label: String,
}

impl CircleMark {
    pub fn contains(&self, point: Point) -> bool {
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// The full visual tree of one render.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub layout: PlotLayout,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Circles in draw order; later circles paint over earlier ones.
    pub circles: Vec<CircleMark>,
}

impl Scene {
    pub fn width(&self) -> f64 {
        self.layout.width
    }

    pub fn height(&self) -> f64 {
        self.layout.height
    }

    /// Plot-area origin in chart coordinates.
    pub fn origin(&self) -> Point {
        self.layout.origin()
    }

    /// Index of the topmost circle under a plot-local point.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.circles.iter().rposition(|c| c.contains(point))
    }

    pub fn tick_count(&self) -> usize {
        self.x_axis.ticks.len() + self.y_axis.ticks.len()
    }

    /// Serialize as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let origin = self.origin();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            num(self.width()),
            num(self.height()),
            num(self.width()),
            num(self.height())
        );
        let _ = writeln!(
            out,
            r#"  <g id="scatterplot" transform="translate({}, {})">"#,
            num(origin.x),
            num(origin.y)
        );
        self.x_axis.write_svg(&mut out, "axis axis-x");
        self.y_axis.write_svg(&mut out, "axis axis-y");

        for circle in &self.circles {
            let fill = circle
                .fill
                .svg_attr()
                .map(|f| format!(r#" fill="{}""#, f))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                r#"    <circle cx="{}" cy="{}" r="{}"{}><title>{}</title></circle>"#,
                num(circle.center.x),
                num(circle.center.y),
                num(circle.radius),
                fill,
                escape_xml(&circle.label)
            );
        }

        out.push_str("  </g>\n</svg>\n");
        out
    }
}

/// Compact number formatting for SVG attributes.
fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let s = format!("{:.3}", rounded);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: f64, y: f64, r: f64, label: &str) -> CircleMark {
        CircleMark {
            center: Point::new(x, y),
            radius: r,
            fill: Fill::Rgb(1, 2, 3),
            label: label.to_string(),
        }
    }

    fn axis(orient: AxisOrient) -> Axis {
        Axis {
            orient,
            translate: Point::default(),
            range: (0.0, 100.0),
            ticks: vec![Tick {
                offset: 50.0,
                label: "1,000".to_string(),
            }],
            title: AxisTitle {
                text: "Title".to_string(),
                anchor: Point::new(-60.0, 50.0),
                rotated: orient == AxisOrient::Left,
            },
        }
    }

    fn scene(circles: Vec<CircleMark>) -> Scene {
        Scene {
            layout: PlotLayout::default(),
            x_axis: axis(AxisOrient::Bottom),
            y_axis: axis(AxisOrient::Left),
            circles,
        }
    }

    #[test]
    fn default_layout_matches_chart_size() {
        let layout = PlotLayout::default();
        assert_eq!(layout.plot_width(), 510.0);
        assert_eq!(layout.plot_height(), 310.0);
        assert_eq!(layout.origin(), Point::new(70.0, 20.0));
    }

    #[test]
    fn parses_palette_hex() {
        assert_eq!(Fill::from_hex("#9172FF"), Fill::Rgb(0x91, 0x72, 0xFF));
        assert_eq!(Fill::from_hex("#"), Fill::Unset);
        assert_eq!(Fill::from_hex("9172FF"), Fill::Unset);
        assert_eq!(Fill::from_hex("#GG0000"), Fill::Unset);
        assert_eq!(Fill::Unset.rgb(), (0, 0, 0));
    }

    #[test]
    fn hit_test_prefers_topmost_circle() {
        let s = scene(vec![
            circle(10.0, 10.0, 8.0, "bottom"),
            circle(14.0, 10.0, 8.0, "top"),
        ]);
        assert_eq!(s.hit_test(Point::new(12.0, 10.0)), Some(1));
        assert_eq!(s.hit_test(Point::new(3.0, 10.0)), Some(0));
        assert_eq!(s.hit_test(Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn svg_nests_plot_group_with_margin_translate() {
        let svg = scene(vec![circle(1.0, 2.0, 3.0, "A & B: 10")]).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="600" height="400""#));
        assert!(svg.contains(r#"<g id="scatterplot" transform="translate(70, 20)">"#));
        assert!(svg.contains(r##"<circle cx="1" cy="2" r="3" fill="#010203"><title>A &amp; B: 10</title></circle>"##));
        assert_eq!(svg.matches("<circle").count(), 1);
        assert_eq!(svg.matches(r#"class="tick""#).count(), 2);
        assert!(svg.contains(r#"transform="rotate(-90)" x="-50" y="-60""#));
    }

    #[test]
    fn unset_fill_is_omitted_from_svg() {
        let mut c = circle(1.0, 2.0, 3.0, "x");
        c.fill = Fill::Unset;
        let svg = scene(vec![c]).to_svg();
        assert!(svg.contains(r#"<circle cx="1" cy="2" r="3"><title>"#));
    }

    #[test]
    fn number_formatting_trims_zeros() {
        assert_eq!(num(3.0), "3");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(1.23456), "1.235");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn domain_paths_follow_orientation() {
        let bottom = axis(AxisOrient::Bottom);
        assert_eq!(
            bottom.domain_path(),
            vec![
                Point::new(0.0, 6.0),
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 6.0),
            ]
        );
        let left = axis(AxisOrient::Left);
        let (a, b) = left.tick_line(&left.ticks[0]);
        assert_eq!(a, Point::new(0.0, 50.0));
        assert_eq!(b, Point::new(-6.0, 50.0));
    }
}
