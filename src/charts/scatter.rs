//! Scatterplot Builder
//! Turns records and the selected year into a `Scene`.

use crate::charts::scale::LinearScale;
use crate::charts::scene::{
    Axis, AxisOrient, AxisTitle, CircleMark, Fill, PlotLayout, Point, Scene, Tick,
};
use crate::data::{records_for_year, PopulationRecord};

/// Bubble colors, cycled by position within the selected year.
/// The last entry is not a valid color and renders as the SVG default.
pub const PALETTE: [&str; 6] = ["#9172FF", "#F9CB4C", "#4BB2FF", "#FFC852", "#7BFF9E", "#"];

/// Fixed growth-rate domain, in percent.
pub const GROWTH_DOMAIN: (f64, f64) = (0.0, 3.0);
pub const RADIUS_RANGE: (f64, f64) = (3.0, 20.0);
pub const TICK_COUNT: usize = 5;

pub const X_AXIS_TITLE: &str = "Population Density";
pub const Y_AXIS_TITLE: &str = "Population Growth (%)";

/// Scales for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterScales {
    pub x: LinearScale,
    pub y: LinearScale,
    pub r: LinearScale,
}

impl ScatterScales {
    pub fn for_records(records: &[&PopulationRecord], layout: &PlotLayout) -> Self {
        Self {
            x: LinearScale::from_zero_to_max(
                records.iter().map(|r| r.density_value()),
                (0.0, layout.plot_width()),
            ),
            y: LinearScale::new(GROWTH_DOMAIN, (layout.plot_height(), 0.0)),
            r: LinearScale::from_zero_to_max(
                records.iter().map(|r| r.population_value()),
                RADIUS_RANGE,
            ),
        }
    }
}

/// Palette fill for the circle at `index`.
pub fn palette_fill(index: usize) -> Fill {
    Fill::from_hex(PALETTE[index % PALETTE.len()])
}

/// Build the scatterplot for `selected_year`.
///
/// The result depends only on the arguments, so rendering the same inputs
/// twice yields equal scenes. An unknown year produces axes and no circles.
pub fn render_scatterplot(
    records: &[PopulationRecord],
    selected_year: &str,
    layout: &PlotLayout,
) -> Scene {
    let filtered: Vec<&PopulationRecord> = records_for_year(records, selected_year).collect();
    let scales = ScatterScales::for_records(&filtered, layout);

    let x_axis = Axis {
        orient: AxisOrient::Bottom,
        translate: Point::new(0.0, layout.plot_height()),
        range: scales.x.range(),
        ticks: axis_ticks(&scales.x),
        title: AxisTitle {
            text: X_AXIS_TITLE.to_string(),
            anchor: Point::new(layout.plot_width() / 2.0, 40.0),
            rotated: false,
        },
    };

    let (y0, y1) = scales.y.range();
    let y_axis = Axis {
        orient: AxisOrient::Left,
        translate: Point::default(),
        range: (y0.min(y1), y0.max(y1)),
        ticks: axis_ticks(&scales.y),
        title: AxisTitle {
            text: Y_AXIS_TITLE.to_string(),
            anchor: Point::new(-60.0, layout.plot_height() / 2.0),
            rotated: true,
        },
    };

    let circles = filtered
        .iter()
        .enumerate()
        .map(|(i, record)| CircleMark {
            center: Point::new(
                scales.x.scale(record.density_value()),
                scales.y.scale(record.growth_rate_value()),
            ),
            radius: scales.r.scale(record.population_value()),
            fill: palette_fill(i),
            label: record.tooltip_text(),
        })
        .collect();

    Scene {
        layout: *layout,
        x_axis,
        y_axis,
        circles,
    }
}

fn axis_ticks(scale: &LinearScale) -> Vec<Tick> {
    scale
        .tick_labels(TICK_COUNT)
        .into_iter()
        .map(|(value, label)| Tick {
            offset: scale.scale(value),
            label,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(country: &str, year: &str, pop: f64, density: f64, growth: f64) -> PopulationRecord {
        PopulationRecord {
            country: country.to_string(),
            year: year.to_string(),
            population: pop.to_string(),
            density: density.to_string(),
            growth_rate: growth.to_string(),
        }
    }

    fn dataset() -> Vec<PopulationRecord> {
        vec![
            rec("India", "1960", 450_000_000.0, 150.0, 2.0),
            rec("Chad", "1960", 3_000_000.0, 2.5, 2.1),
            rec("Japan", "1960", 92_000_000.0, 250.0, 0.9),
            rec("India", "1970", 555_000_000.0, 190.0, 2.3),
            rec("Chad", "1970", 3_600_000.0, 3.0, 2.2),
        ]
    }

    #[test]
    fn draws_one_circle_per_record_of_selected_year() {
        let records = dataset();
        for year in ["1960", "1970"] {
            let scene = render_scatterplot(&records, year, &PlotLayout::default());
            let expected: Vec<String> = records
                .iter()
                .filter(|r| r.year == year)
                .map(|r| r.tooltip_text())
                .collect();
            let labels: Vec<String> = scene.circles.iter().map(|c| c.label.clone()).collect();
            assert_eq!(labels, expected);
        }
    }

    #[test]
    fn x_position_is_monotonic_in_density() {
        let scene = render_scatterplot(&dataset(), "1960", &PlotLayout::default());
        let chad = &scene.circles[1];
        let india = &scene.circles[0];
        let japan = &scene.circles[2];
        assert!(chad.center.x < india.center.x);
        assert!(india.center.x < japan.center.x);
        assert!((japan.center.x - 510.0).abs() < 1e-9);
    }

    #[test]
    fn y_position_is_inverted() {
        let records = vec![rec("A", "2000", 1.0, 1.0, 0.0), rec("B", "2000", 1.0, 1.0, 3.0)];
        let scene = render_scatterplot(&records, "2000", &PlotLayout::default());
        assert!((scene.circles[0].center.y - 310.0).abs() < 1e-9);
        assert!(scene.circles[1].center.y.abs() < 1e-9);
    }

    #[test]
    fn largest_population_gets_max_radius() {
        let scene = render_scatterplot(&dataset(), "1960", &PlotLayout::default());
        let radii: Vec<f64> = scene.circles.iter().map(|c| c.radius).collect();
        assert!((radii[0] - 20.0).abs() < 1e-9);
        assert!(radii[1] < radii[2] && radii[2] < radii[0]);
        assert!(radii.iter().all(|r| (3.0..=20.0).contains(r)));
    }

    #[test]
    fn unknown_year_renders_valid_empty_plot() {
        let scene = render_scatterplot(&dataset(), "1999", &PlotLayout::default());
        assert!(scene.circles.is_empty());
        assert!(!scene.x_axis.ticks.is_empty());
        assert!(scene
            .x_axis
            .ticks
            .iter()
            .chain(scene.y_axis.ticks.iter())
            .all(|t| t.offset.is_finite()));
    }

    #[test]
    fn render_is_idempotent() {
        let records = dataset();
        let layout = PlotLayout::default();
        let first = render_scatterplot(&records, "1960", &layout);
        let second = render_scatterplot(&records, "1960", &layout);
        assert_eq!(first, second);
        assert_eq!(first.circles.len(), second.circles.len());
        assert_eq!(first.tick_count(), second.tick_count());
        assert_eq!(first.to_svg(), second.to_svg());
    }

    #[test]
    fn switching_year_replaces_all_circles() {
        let records = dataset();
        let layout = PlotLayout::default();
        let _ = render_scatterplot(&records, "1960", &layout);
        let scene = render_scatterplot(&records, "1970", &layout);
        assert_eq!(scene.circles.len(), 2);
        assert!(scene.circles.iter().all(|c| !c.label.starts_with("Japan")));
    }

    #[test]
    fn palette_cycles_and_sixth_entry_is_unset() {
        let records: Vec<PopulationRecord> = (0..7)
            .map(|i| rec(&format!("C{}", i), "1960", 1.0, 1.0, 1.0))
            .collect();
        let scene = render_scatterplot(&records, "1960", &PlotLayout::default());
        assert_eq!(scene.circles[0].fill, Fill::Rgb(0x91, 0x72, 0xFF));
        assert_eq!(scene.circles[5].fill, Fill::Unset);
        assert_eq!(scene.circles[6].fill, scene.circles[0].fill);
    }

    #[test]
    fn axes_carry_titles_and_growth_ticks() {
        let scene = render_scatterplot(&dataset(), "1960", &PlotLayout::default());
        assert_eq!(scene.x_axis.title.text, "Population Density");
        assert_eq!(scene.y_axis.title.text, "Population Growth (%)");
        assert!(scene.y_axis.title.rotated);
        let labels: Vec<&str> = scene.y_axis.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["0.0", "0.5", "1.0", "1.5", "2.0", "2.5", "3.0"]);
        assert_eq!(scene.x_axis.translate, Point::new(0.0, 310.0));
    }
}
