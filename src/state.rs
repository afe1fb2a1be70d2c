//! View State Module
//! The single state object owned by the app and the events that change it.
//!
//! All mutation goes through `ViewState::apply`. The scene is rebuilt only
//! when the records or the selected year change; pointer events touch the
//! tooltip alone.

use crate::charts::{render_scatterplot, PlotLayout, Point, Scene};
use crate::data::{distinct_years, ParsedCsv, PopulationRecord};
use std::sync::Arc;
use tracing::{debug, info};

/// Peak tooltip opacity.
pub const TOOLTIP_OPACITY: f32 = 0.9;
/// Fade-in duration, seconds.
pub const TOOLTIP_FADE_SECS: f64 = 0.2;
/// Tooltip offset from the pointer while moving.
pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, 10.0);

/// Transient hover tooltip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TooltipState {
    pub visible: bool,
    pub text: String,
    /// Plot-local position of the tooltip's top-left corner.
    pub position: Point,
    /// Index of the hovered circle in the current scene.
    pub hovered: Option<usize>,
    /// Last plot-local pointer position seen while hovering.
    pub pointer: Point,
    /// Time the fade-in started, seconds.
    shown_at: f64,
}

impl TooltipState {
    /// Opacity at time `now`, easing in from 0 to `TOOLTIP_OPACITY`.
    pub fn opacity(&self, now: f64) -> f32 {
        if !self.visible {
            return 0.0;
        }
        let t = ((now - self.shown_at) / TOOLTIP_FADE_SECS).clamp(0.0, 1.0);
        TOOLTIP_OPACITY * ease_cubic_in_out(t) as f32
    }

    /// True while the fade-in is still running.
    pub fn is_fading(&self, now: f64) -> bool {
        self.visible && now - self.shown_at < TOOLTIP_FADE_SECS
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Where the dataset is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Retrying { attempt: u32, error: String },
    Ready { records: usize, skipped: usize },
    /// Load finished but produced no usable rows.
    NoData { skipped: usize },
    Failed(String),
}

impl LoadStatus {
    pub fn message(&self) -> String {
        match self {
            LoadStatus::Idle => "Ready".to_string(),
            LoadStatus::Loading => "Loading CSV file...".to_string(),
            LoadStatus::Retrying { attempt, error } => {
                format!("Load attempt {} failed ({}), retrying...", attempt, error)
            }
            LoadStatus::Ready { records, skipped: 0 } => format!("Loaded {} records", records),
            LoadStatus::Ready { records, skipped } => {
                format!("Loaded {} records ({} rows skipped)", records, skipped)
            }
            LoadStatus::NoData { skipped } => {
                format!("No data: file contains no valid rows ({} skipped)", skipped)
            }
            LoadStatus::Failed(error) => format!("Error: {}", error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadStatus::Failed(_) | LoadStatus::NoData { .. })
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, LoadStatus::Loading | LoadStatus::Retrying { .. })
    }
}

/// Discrete state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    LoadStarted,
    LoadRetrying { attempt: u32, error: String },
    DataLoaded(ParsedCsv),
    LoadFailed(String),
    YearSelected(String),
    PointerEntered { circle: usize, position: Point, time: f64 },
    PointerMoved { position: Point },
    PointerLeft,
}

/// Everything the view renders from.
pub struct ViewState {
    records: Arc<[PopulationRecord]>,
    years: Vec<String>,
    selected_year: String,
    layout: PlotLayout,
    scene: Scene,
    pub tooltip: TooltipState,
    pub status: LoadStatus,
}

impl ViewState {
    pub fn new(default_year: impl Into<String>, layout: PlotLayout) -> Self {
        let selected_year = default_year.into();
        let records: Arc<[PopulationRecord]> = Arc::from(Vec::new());
        let scene = render_scatterplot(&records, &selected_year, &layout);
        Self {
            records,
            years: Vec::new(),
            selected_year,
            layout,
            scene,
            tooltip: TooltipState::default(),
            status: LoadStatus::Idle,
        }
    }

    /// Distinct years for the selector, in first-occurrence order.
    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn selected_year(&self) -> &str {
        &self.selected_year
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn has_data(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn apply(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::LoadStarted => self.status = LoadStatus::Loading,
            ViewEvent::LoadRetrying { attempt, error } => {
                self.status = LoadStatus::Retrying { attempt, error };
            }
            ViewEvent::DataLoaded(parsed) => self.set_records(parsed),
            ViewEvent::LoadFailed(error) => {
                self.status = LoadStatus::Failed(error);
                self.records = Arc::from(Vec::new());
                self.years.clear();
                self.rebuild_scene();
            }
            ViewEvent::YearSelected(year) => {
                if year != self.selected_year {
                    debug!(year = %year, "Year selected");
                    self.selected_year = year;
                    self.rebuild_scene();
                }
            }
            ViewEvent::PointerEntered {
                circle,
                position,
                time,
            } => {
                let Some(mark) = self.scene.circles.get(circle) else {
                    return;
                };
                self.tooltip = TooltipState {
                    visible: true,
                    text: mark.label.clone(),
                    position,
                    hovered: Some(circle),
                    pointer: position,
                    shown_at: time,
                };
            }
            ViewEvent::PointerMoved { position } => {
                if self.tooltip.visible {
                    self.tooltip.pointer = position;
                    self.tooltip.position = position.offset(TOOLTIP_OFFSET.0, TOOLTIP_OFFSET.1);
                }
            }
            ViewEvent::PointerLeft => {
                self.tooltip.visible = false;
                self.tooltip.hovered = None;
            }
        }
    }

    fn set_records(&mut self, parsed: ParsedCsv) {
        let skipped = parsed.skipped.len();
        self.records = Arc::from(parsed.records);
        self.years = distinct_years(&self.records);

        self.status = if self.records.is_empty() {
            LoadStatus::NoData { skipped }
        } else {
            LoadStatus::Ready {
                records: self.records.len(),
                skipped,
            }
        };

        if !self.years.contains(&self.selected_year) {
            if let Some(first) = self.years.first() {
                info!(
                    from = %self.selected_year,
                    to = %first,
                    "Selected year not in dataset, using first year"
                );
                self.selected_year = first.clone();
            }
        }
        self.rebuild_scene();
    }

    fn rebuild_scene(&mut self) {
        self.scene = render_scatterplot(&self.records, &self.selected_year, &self.layout);
        // Circle indices refer to the old scene.
        self.tooltip = TooltipState::default();
    }
}

/// Turn per-frame hover results into enter/move/leave events.
///
/// A pointer resting on the hovered circle produces no events.
pub fn pointer_transition(
    tooltip: &TooltipState,
    current: Option<usize>,
    position: Point,
    time: f64,
) -> Vec<ViewEvent> {
    match (tooltip.hovered, current) {
        (None, None) => Vec::new(),
        (None, Some(circle)) => vec![ViewEvent::PointerEntered {
            circle,
            position,
            time,
        }],
        (Some(_), None) => vec![ViewEvent::PointerLeft],
        (Some(prev), Some(circle)) if prev == circle => {
            if tooltip.pointer == position {
                Vec::new()
            } else {
                vec![ViewEvent::PointerMoved { position }]
            }
        }
        (Some(_), Some(circle)) => vec![
            ViewEvent::PointerLeft,
            ViewEvent::PointerEntered {
                circle,
                position,
                time,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RowError, RowErrorKind};
    use pretty_assertions::assert_eq;

    fn rec(country: &str, year: &str, pop: &str) -> PopulationRecord {
        PopulationRecord {
            country: country.to_string(),
            year: year.to_string(),
            population: pop.to_string(),
            density: "10".to_string(),
            growth_rate: "1.2".to_string(),
        }
    }

    fn loaded(records: Vec<PopulationRecord>) -> ViewEvent {
        ViewEvent::DataLoaded(ParsedCsv {
            records,
            skipped: Vec::new(),
        })
    }

    fn state_with_data() -> ViewState {
        let mut state = ViewState::new("1960", PlotLayout::default());
        state.apply(loaded(vec![
            rec("Peru", "1960", "10000000"),
            rec("Chile", "1960", "7600000"),
            rec("Peru", "1970", "13000000"),
        ]));
        state
    }

    #[test]
    fn starts_idle_with_empty_valid_scene() {
        let state = ViewState::new("1960", PlotLayout::default());
        assert_eq!(state.status, LoadStatus::Idle);
        assert!(state.scene().circles.is_empty());
        assert!(state.years().is_empty());
    }

    #[test]
    fn loading_populates_years_and_scene() {
        let state = state_with_data();
        assert_eq!(state.years(), ["1960", "1970"]);
        assert_eq!(state.selected_year(), "1960");
        assert_eq!(state.scene().circles.len(), 2);
        assert_eq!(state.status, LoadStatus::Ready { records: 3, skipped: 0 });
    }

    #[test]
    fn missing_default_year_falls_back_to_first_year() {
        let mut state = ViewState::new("1960", PlotLayout::default());
        state.apply(loaded(vec![rec("Peru", "2000", "1"), rec("Peru", "1990", "1")]));
        assert_eq!(state.selected_year(), "2000");
        assert_eq!(state.scene().circles.len(), 1);
    }

    #[test]
    fn selecting_year_rebuilds_scene() {
        let mut state = state_with_data();
        state.apply(ViewEvent::YearSelected("1970".to_string()));
        assert_eq!(state.scene().circles.len(), 1);
        assert_eq!(state.scene().circles[0].label, "Peru: 13000000");

        state.apply(ViewEvent::YearSelected("1850".to_string()));
        assert!(state.scene().circles.is_empty());
    }

    #[test]
    fn hover_shows_country_and_population() {
        let mut state = state_with_data();
        state.apply(ViewEvent::PointerEntered {
            circle: 1,
            position: Point::new(5.0, 6.0),
            time: 1.0,
        });
        assert!(state.tooltip.visible);
        assert_eq!(state.tooltip.text, "Chile: 7600000");
        assert_eq!(state.tooltip.position, Point::new(5.0, 6.0));

        state.apply(ViewEvent::PointerMoved {
            position: Point::new(20.0, 30.0),
        });
        assert_eq!(state.tooltip.position, Point::new(30.0, 40.0));

        state.apply(ViewEvent::PointerLeft);
        assert!(!state.tooltip.visible);
        assert_eq!(state.tooltip.opacity(5.0), 0.0);
    }

    #[test]
    fn tooltip_fades_in_over_200ms() {
        let mut state = state_with_data();
        state.apply(ViewEvent::PointerEntered {
            circle: 0,
            position: Point::default(),
            time: 10.0,
        });
        let tooltip = &state.tooltip;
        assert_eq!(tooltip.opacity(10.0), 0.0);
        let mid = tooltip.opacity(10.1);
        assert!(mid > 0.0 && mid < TOOLTIP_OPACITY);
        assert!(tooltip.is_fading(10.1));
        assert_eq!(tooltip.opacity(10.25), TOOLTIP_OPACITY);
        assert_eq!(tooltip.opacity(99.0), TOOLTIP_OPACITY);
        assert!(!tooltip.is_fading(10.3));
    }

    #[test]
    fn enter_on_missing_circle_is_ignored() {
        let mut state = state_with_data();
        state.apply(ViewEvent::PointerEntered {
            circle: 42,
            position: Point::default(),
            time: 0.0,
        });
        assert!(!state.tooltip.visible);
    }

    #[test]
    fn move_without_hover_keeps_tooltip_hidden() {
        let mut state = state_with_data();
        state.apply(ViewEvent::PointerMoved {
            position: Point::new(1.0, 1.0),
        });
        assert_eq!(state.tooltip, TooltipState::default());
    }

    #[test]
    fn year_change_resets_tooltip() {
        let mut state = state_with_data();
        state.apply(ViewEvent::PointerEntered {
            circle: 1,
            position: Point::default(),
            time: 0.0,
        });
        state.apply(ViewEvent::YearSelected("1970".to_string()));
        assert!(!state.tooltip.visible);
        assert_eq!(state.tooltip.hovered, None);
    }

    #[test]
    fn all_rows_skipped_is_no_data() {
        let mut state = ViewState::new("1960", PlotLayout::default());
        state.apply(ViewEvent::DataLoaded(ParsedCsv {
            records: Vec::new(),
            skipped: vec![RowError {
                line: 2,
                kind: RowErrorKind::TooFewColumns { needed: 5, found: 1 },
            }],
        }));
        assert_eq!(state.status, LoadStatus::NoData { skipped: 1 });
        assert!(state.status.is_error());
        assert!(!state.has_data());
    }

    #[test]
    fn failure_clears_records_and_reports_error() {
        let mut state = state_with_data();
        state.apply(ViewEvent::LoadStarted);
        assert!(state.status.is_busy());
        state.apply(ViewEvent::LoadFailed("disk on fire".to_string()));
        assert_eq!(state.status.message(), "Error: disk on fire");
        assert!(!state.has_data());
        assert!(state.scene().circles.is_empty());
    }

    #[test]
    fn status_messages() {
        assert_eq!(
            LoadStatus::Ready { records: 4, skipped: 0 }.message(),
            "Loaded 4 records"
        );
        assert_eq!(
            LoadStatus::Ready { records: 4, skipped: 2 }.message(),
            "Loaded 4 records (2 rows skipped)"
        );
    }

    #[test]
    fn pointer_transitions() {
        let p = Point::new(1.0, 2.0);
        let idle = TooltipState::default();
        assert!(pointer_transition(&idle, None, p, 0.0).is_empty());
        assert_eq!(
            pointer_transition(&idle, Some(3), p, 0.5),
            vec![ViewEvent::PointerEntered {
                circle: 3,
                position: p,
                time: 0.5,
            }]
        );

        let hovering = TooltipState {
            visible: true,
            hovered: Some(3),
            pointer: Point::new(0.0, 0.0),
            ..TooltipState::default()
        };
        assert_eq!(
            pointer_transition(&hovering, Some(3), p, 0.5),
            vec![ViewEvent::PointerMoved { position: p }]
        );
        assert_eq!(
            pointer_transition(&hovering, None, p, 0.5),
            vec![ViewEvent::PointerLeft]
        );
        assert_eq!(pointer_transition(&hovering, Some(4), p, 0.5).len(), 2);
    }

    #[test]
    fn resting_pointer_produces_no_events() {
        let mut state = state_with_data();
        let p = Point::new(5.0, 6.0);
        for event in pointer_transition(&state.tooltip, Some(0), p, 1.0) {
            state.apply(event);
        }
        assert_eq!(state.tooltip.hovered, Some(0));
        assert!(pointer_transition(&state.tooltip, Some(0), p, 2.0).is_empty());

        let moved = Point::new(7.0, 6.0);
        let events = pointer_transition(&state.tooltip, Some(0), moved, 3.0);
        assert_eq!(events, vec![ViewEvent::PointerMoved { position: moved }]);
        for event in events {
            state.apply(event);
        }
        assert!(pointer_transition(&state.tooltip, Some(0), moved, 4.0).is_empty());
    }
}
