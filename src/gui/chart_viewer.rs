//! Chart Viewer Widget
//! Paints the current scene with egui and turns pointer hover into events.

use crate::charts::{AxisOrient, Point, Scene};
use crate::state::{pointer_transition, TooltipState, ViewEvent, ViewState};
use egui::epaint::TextShape;
use egui::{Align2, Color32, FontId, Id, LayerId, Order, Pos2, RichText, Sense, Stroke, Vec2};

const TICK_FONT: f32 = 10.0;
const TITLE_FONT: f32 = 14.0;
const TOOLTIP_FONT: f32 = 13.0;

/// Central panel showing the scatterplot.
#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the chart and return the pointer events produced this frame.
    pub fn show(&mut self, ui: &mut egui::Ui, state: &ViewState) -> Vec<ViewEvent> {
        if !state.has_data() {
            let text = if state.status.is_busy() {
                "Loading...".to_string()
            } else if state.status.is_error() {
                state.status.message()
            } else {
                "No Data".to_string()
            };
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(text).size(20.0));
            });
            return Vec::new();
        }

        ui.add_space(10.0);
        ui.heading("Population Growth vs Density Correlation");
        ui.add_space(10.0);

        // Layouts from config may exceed the panel.
        egui::ScrollArea::both()
            .show(ui, |ui| {
                let scene = state.scene();
                let size = Vec2::new(scene.width() as f32, scene.height() as f32);
                let (response, painter) = ui.allocate_painter(size, Sense::hover());
                painter.rect_filled(response.rect, 0.0, Color32::WHITE);

                let plot_origin = response.rect.min
                    + Vec2::new(scene.origin().x as f32, scene.origin().y as f32);
                Self::paint_scene(&painter, scene, plot_origin);

                let now = ui.input(|i| i.time);
                let (hovered, local) = match response.hover_pos() {
                    Some(pos) => {
                        let local = Point::new(
                            (pos.x - plot_origin.x) as f64,
                            (pos.y - plot_origin.y) as f64,
                        );
                        (scene.hit_test(local), local)
                    }
                    None => (None, Point::default()),
                };

                if state.tooltip.visible {
                    Self::paint_tooltip(ui.ctx(), &state.tooltip, plot_origin, now);
                }

                pointer_transition(&state.tooltip, hovered, local, now)
            })
            .inner
    }

    fn paint_scene(painter: &egui::Painter, scene: &Scene, plot_origin: Pos2) {
        let to_screen = |p: Point| plot_origin + Vec2::new(p.x as f32, p.y as f32);
        let stroke = Stroke::new(1.0, Color32::BLACK);

        for axis in [&scene.x_axis, &scene.y_axis] {
            let domain: Vec<Pos2> = axis.domain_path().into_iter().map(to_screen).collect();
            painter.add(egui::Shape::line(domain, stroke));

            let align = match axis.orient {
                AxisOrient::Bottom => Align2::CENTER_TOP,
                AxisOrient::Left => Align2::RIGHT_CENTER,
            };
            for tick in &axis.ticks {
                let (a, b) = axis.tick_line(tick);
                painter.line_segment([to_screen(a), to_screen(b)], stroke);
                painter.text(
                    to_screen(axis.tick_label_anchor(tick)),
                    align,
                    &tick.label,
                    FontId::proportional(TICK_FONT),
                    Color32::BLACK,
                );
            }

            let anchor = to_screen(axis.title_anchor());
            if axis.title.rotated {
                let galley = painter.layout_no_wrap(
                    axis.title.text.clone(),
                    FontId::proportional(TITLE_FONT),
                    Color32::BLACK,
                );
                // Rotating -90° about the top-left corner makes the text run
                // upward; center it vertically on the anchor.
                let pos = Pos2::new(
                    anchor.x - galley.size().y,
                    anchor.y + galley.size().x / 2.0,
                );
                painter.add(
                    TextShape::new(pos, galley, Color32::BLACK)
                        .with_angle(-std::f32::consts::FRAC_PI_2),
                );
            } else {
                painter.text(
                    anchor,
                    Align2::CENTER_BOTTOM,
                    &axis.title.text,
                    FontId::proportional(TITLE_FONT),
                    Color32::BLACK,
                );
            }
        }

        for circle in &scene.circles {
            let (r, g, b) = circle.fill.rgb();
            painter.circle_filled(
                to_screen(circle.center),
                circle.radius as f32,
                Color32::from_rgb(r, g, b),
            );
        }
    }

    fn paint_tooltip(ctx: &egui::Context, tooltip: &TooltipState, plot_origin: Pos2, now: f64) {
        let opacity = tooltip.opacity(now);
        if opacity <= 0.0 {
            return;
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Tooltip, Id::new("scatter_tooltip")));
        let text_color = Color32::WHITE.gamma_multiply(opacity);
        let galley = painter.layout_no_wrap(
            tooltip.text.clone(),
            FontId::proportional(TOOLTIP_FONT),
            text_color,
        );

        let pos = plot_origin + Vec2::new(tooltip.position.x as f32, tooltip.position.y as f32);
        let bg_rect = egui::Rect::from_min_size(pos, galley.size() + Vec2::splat(12.0));
        painter.rect_filled(bg_rect, 4.0, Color32::BLACK.gamma_multiply(opacity));
        painter.galley(bg_rect.min + Vec2::splat(6.0), galley, text_color);
    }
}
