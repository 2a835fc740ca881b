//! Shared UI components.

use eframe::egui::{self, Color32, CornerRadius, Margin, Response, RichText, Ui};

/// Status indicator colors.
pub mod colors {
    use super::Color32;

    pub const SUCCESS: Color32 = Color32::from_rgb(100, 200, 100);
    pub const ERROR: Color32 = Color32::from_rgb(255, 100, 100);
    pub const NEUTRAL: Color32 = Color32::from_rgb(150, 150, 150);
    /// Programme green, shared with the PDF table header.
    pub const BRAND: Color32 = Color32::from_rgb(22, 160, 133);
}

/// Render a back link that returns true when clicked.
pub fn back_button(ui: &mut Ui, label: &str) -> bool {
    ui.button(RichText::new(format!("< {label}")).size(14.0)).clicked()
}

/// Render a panel header with title.
pub fn panel_header(ui: &mut Ui, title: &str) {
    ui.heading(RichText::new(title).size(24.0));
    ui.add_space(10.0);
    ui.separator();
    ui.add_space(20.0);
}

/// Filled call-to-action button.
pub fn primary_button_with_icon(ui: &mut Ui, icon: &str, label: &str) -> Response {
    ui.add(
        egui::Button::new(RichText::new(format!("{icon}  {label}")).color(Color32::WHITE))
            .fill(colors::BRAND)
            .min_size(egui::vec2(0.0, 32.0)),
    )
}

/// Same as [`primary_button_with_icon`] but can be disabled.
pub fn primary_button_enabled(ui: &mut Ui, enabled: bool, icon: &str, label: &str) -> Response {
    ui.add_enabled(
        enabled,
        egui::Button::new(RichText::new(format!("{icon}  {label}")).color(Color32::WHITE))
            .fill(colors::BRAND)
            .min_size(egui::vec2(0.0, 32.0)),
    )
}

pub fn styled_button_with_icon(ui: &mut Ui, icon: &str, label: &str) -> Response {
    ui.add(egui::Button::new(format!("{icon}  {label}")).min_size(egui::vec2(0.0, 32.0)))
}

/// Icon-only table action.
pub fn action_button(ui: &mut Ui, enabled: bool, icon: &str, tooltip: &str) -> Response {
    let response = ui.add_enabled(enabled, egui::Button::new(icon).small());
    if enabled {
        response.on_hover_text(tooltip)
    } else {
        response.on_disabled_hover_text(tooltip)
    }
}

/// Icon-only destructive table action.
pub fn danger_action_button(ui: &mut Ui, icon: &str, tooltip: &str) -> Response {
    ui.add(egui::Button::new(RichText::new(icon).color(colors::ERROR)).small())
        .on_hover_text(tooltip)
}

/// Render a stat card with title, value, and subtitle.
pub fn stat_card(ui: &mut Ui, title: &str, value: &str, subtitle: &str) {
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(Margin::same(15))
        .outer_margin(Margin::same(5))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.set_min_width(180.0);

            ui.vertical(|ui| {
                ui.label(RichText::new(title).small());
                ui.label(RichText::new(value).heading().strong());
                ui.label(RichText::new(subtitle).small().weak());
            });
        });
}

/// Framed box reserving space for a chart that is not drawn yet.
pub fn chart_placeholder(ui: &mut Ui, title: &str, size: egui::Vec2) {
    egui::Frame::new()
        .fill(ui.style().visuals.extreme_bg_color)
        .inner_margin(Margin::same(15))
        .outer_margin(Margin::same(5))
        .corner_radius(CornerRadius::same(8))
        .show(ui, |ui| {
            ui.set_min_size(size);
            ui.vertical(|ui| {
                ui.label(RichText::new(title).strong());
                ui.add_space(size.y / 3.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("Graphique en cours de développement").weak());
                });
            });
        });
}
