//! Admin login screen.

use eframe::egui::{self, CornerRadius, Key, Margin, RichText, Ui};
use egui_phosphor::regular::{LOCK_KEY, SIGN_IN};

use super::app::App;
use super::components::{back_button, colors, primary_button_enabled};

/// Show the login panel.
///
/// Returns `true` if the back link was clicked.
pub fn show(app: &mut App, ui: &mut Ui) -> bool {
    let mut go_back = false;

    if back_button(ui, "Retour au formulaire") {
        go_back = true;
    }

    ui.vertical_centered(|ui| {
        ui.add_space(60.0);

        egui::Frame::new()
            .fill(ui.style().visuals.extreme_bg_color)
            .inner_margin(Margin::same(30))
            .corner_radius(CornerRadius::same(10))
            .show(ui, |ui| {
                ui.set_width(340.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(LOCK_KEY).size(42.0).color(colors::BRAND));
                    ui.add_space(8.0);
                    ui.label(RichText::new("Accès Administrateur").size(22.0).strong());
                    ui.add_space(20.0);

                    let response = ui.add_enabled(
                        !app.is_logging_in,
                        egui::TextEdit::singleline(&mut app.password_input)
                            .password(true)
                            .desired_width(280.0)
                            .hint_text("Mot de passe"),
                    );
                    let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

                    ui.add_space(15.0);

                    let clicked = primary_button_enabled(ui, !app.is_logging_in, SIGN_IN, "Se connecter").clicked();
                    if (clicked || submitted) && !app.is_logging_in {
                        app.login();
                    }

                    if app.is_logging_in {
                        ui.add_space(10.0);
                        ui.spinner();
                    }

                    if let Some(error) = &app.login_error {
                        ui.add_space(10.0);
                        ui.colored_label(colors::ERROR, error);
                    }
                });
            });
    });

    go_back
}
