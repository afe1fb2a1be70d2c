//! Control Panel Widget
//! Left side panel with the data source, year selector and export controls.

use crate::state::ViewState;
use egui::{Color32, ComboBox, RichText};
use std::path::Path;

/// Left side control panel.
pub struct ControlPanel {
    /// Outcome of the last export, shown under the export buttons.
    export_message: Option<(String, bool)>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self {
            export_message: None,
        }
    }

    pub fn set_export_result(&mut self, message: impl Into<String>, is_error: bool) {
        self.export_message = Some((message.into(), is_error));
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        state: &ViewState,
        source: Option<&Path>,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Population Scatter")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Growth vs Density")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        let busy = state.status.is_busy();
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = source
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if source.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!busy, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseCsv;
                            }
                            if ui.button("⟳ Reload").clicked() {
                                action = ControlPanelAction::Reload;
                            }
                        });
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Year Section =====
        ui.label(RichText::new("📅 Year").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([110.0, 20.0], egui::Label::new("Select Year:"));
            ui.add_enabled_ui(state.has_data(), |ui| {
                ComboBox::from_id_salt("year-select")
                    .width(150.0)
                    .selected_text(state.selected_year())
                    .show_ui(ui, |ui| {
                        for year in state.years() {
                            if ui
                                .selectable_label(state.selected_year() == year.as_str(), year)
                                .clicked()
                            {
                                action = ControlPanelAction::YearSelected(year.clone());
                            }
                        }
                    });
            });
        });

        ui.add_space(5.0);
        let shown = state.scene().circles.len();
        ui.label(
            RichText::new(format!("{} countries in {}", shown, state.selected_year()))
                .size(11.0)
                .color(Color32::GRAY),
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(state.has_data(), |ui| {
                let svg_button = egui::Button::new(RichText::new("🖼 Export SVG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(svg_button).clicked() {
                    action = ControlPanelAction::ExportSvg;
                }

                ui.add_space(8.0);

                let png_button = egui::Button::new(RichText::new("📄 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });

            if let Some((message, is_error)) = &self.export_message {
                ui.add_space(5.0);
                let color = if *is_error {
                    Color32::from_rgb(220, 53, 69)
                } else {
                    Color32::GRAY
                };
                ui.label(RichText::new(message).size(11.0).color(color));
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        if busy {
            ui.add(egui::Spinner::new());
        }

        let status_color = if state.status.is_error() {
            Color32::from_rgb(220, 53, 69)
        } else if state.has_data() {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(
            RichText::new(state.status.message())
                .size(11.0)
                .color(status_color),
        );

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Reload,
    YearSelected(String),
    ExportSvg,
    ExportPng,
}
