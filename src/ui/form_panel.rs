//! Public registration form and its confirmation view.

use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{CHECK_CIRCLE, IMAGE, MOON, PAPER_PLANE_RIGHT, SUN};

use super::app::{App, Screen};
use super::components::{colors, primary_button_enabled, primary_button_with_icon, styled_button_with_icon};
use crate::models::Domain;

const FORM_WIDTH: f32 = 640.0;

/// Show the registration form.
///
/// Returns `Some(screen)` if navigation is requested.
pub fn show(app: &mut App, ui: &mut Ui) -> Option<Screen> {
    let mut next_screen = None;

    ui.horizontal(|ui| {
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let (icon, hint) = if app.config.ui.dark_mode {
                (SUN, "Mode clair")
            } else {
                (MOON, "Mode sombre")
            };
            if ui.button(RichText::new(icon).size(18.0)).on_hover_text(hint).clicked() {
                app.toggle_theme(ui.ctx());
            }
        });
    });

    ScrollArea::vertical().id_salt("form_scroll").show(ui, |ui| {
        ui.vertical_centered(|ui| {
            ui.set_max_width(FORM_WIDTH);

            ui.label(RichText::new("IvoirTech Panel").size(14.0).weak());
            ui.label(RichText::new("Formulaire d'inscription des panelistes").size(26.0).strong());
            ui.add_space(20.0);

            if app.form.submitted {
                show_confirmation(app, ui);
            } else {
                show_fields(app, ui);
            }

            ui.add_space(30.0);
            ui.separator();
            if ui.link("Accès Admin").clicked() {
                next_screen = Some(Screen::Admin);
            }
            ui.add_space(10.0);
        });
    });

    next_screen
}

fn show_confirmation(app: &mut App, ui: &mut Ui) {
    ui.add_space(30.0);
    ui.label(RichText::new(CHECK_CIRCLE).size(64.0).color(colors::SUCCESS));
    ui.add_space(10.0);
    ui.label(RichText::new("Merci pour votre inscription !").size(22.0).strong());
    ui.add_space(5.0);
    ui.label("Votre candidature a bien été enregistrée. Nous vous contacterons prochainement.");
    ui.add_space(20.0);
    if primary_button_with_icon(ui, PAPER_PLANE_RIGHT, "Nouvelle inscription").clicked() {
        app.form.start_over();
    }
}

fn show_fields(app: &mut App, ui: &mut Ui) {
    let enabled = !app.form.sending;

    ui.add_enabled_ui(enabled, |ui| {
        ui.with_layout(Layout::top_down(Align::Min), |ui| {
            egui::Grid::new("identity_grid")
                .num_columns(2)
                .spacing([20.0, 10.0])
                .min_col_width(150.0)
                .show(ui, |ui| {
                    let form = &mut app.form.form;
                    text_row(ui, "Nom *", &mut form.nom, "Votre nom");
                    text_row(ui, "Prénoms *", &mut form.prenom, "Vos prénoms");
                    text_row(ui, "Contact *", &mut form.contact, "Numéro de téléphone");
                    text_row(ui, "E-mail *", &mut form.email, "adresse@exemple.ci");
                    text_row(ui, "Poste occupé *", &mut form.poste, "Intitulé du poste");
                    text_row(
                        ui,
                        "Organisation/Structure/Institution *",
                        &mut form.organisation,
                        "Organisation",
                    );
                });

            ui.add_space(15.0);
            ui.label(RichText::new("Domaines d'expertise *").strong());
            ui.add_space(5.0);

            egui::Grid::new("domains_grid")
                .num_columns(2)
                .spacing([30.0, 6.0])
                .show(ui, |ui| {
                    for (idx, domain) in Domain::ALL.into_iter().enumerate() {
                        let mut checked = app.form.form.is_checked(domain);
                        if ui.checkbox(&mut checked, domain.label()).changed() {
                            app.form.form.set_domain(domain, checked);
                        }
                        if idx % 2 == 1 {
                            ui.end_row();
                        }
                    }
                    ui.end_row();
                });

            if app.form.form.wants_autre() {
                ui.add_space(5.0);
                ui.add(
                    egui::TextEdit::singleline(&mut app.form.form.autre_domaine)
                        .desired_width(FORM_WIDTH)
                        .hint_text("Précisez votre domaine"),
                );
            }

            ui.add_space(15.0);
            egui::Grid::new("experience_grid")
                .num_columns(2)
                .spacing([20.0, 10.0])
                .min_col_width(150.0)
                .show(ui, |ui| {
                    ui.label("Années d'expérience *");
                    ui.add(
                        egui::TextEdit::singleline(&mut app.form.form.experience)
                            .desired_width(80.0)
                            .hint_text("0"),
                    );
                    ui.end_row();
                });

            ui.add_space(15.0);
            ui.label(RichText::new("Photo *").strong());
            ui.label(RichText::new("Formats acceptés: JPEG, PNG (max 5MB)").small().weak());
            ui.add_space(5.0);

            ui.horizontal(|ui| {
                if styled_button_with_icon(ui, IMAGE, "Choisir une photo").clicked() {
                    app.pick_photo(ui.ctx());
                }
                if let Some(photo) = &app.form.form.photo {
                    ui.label(&photo.file_name);
                }
            });

            if let Some(uri) = &app.photo_uri {
                ui.add_space(5.0);
                ui.add(
                    egui::Image::new(uri.as_str())
                        .max_size(egui::vec2(140.0, 140.0))
                        .corner_radius(6),
                );
            }
        });
    });

    ui.add_space(15.0);

    if let Some(error) = &app.form.error {
        ui.colored_label(colors::ERROR, error);
        ui.add_space(10.0);
    }

    ui.horizontal(|ui| {
        if primary_button_enabled(ui, enabled, PAPER_PLANE_RIGHT, "Soumettre").clicked() {
            app.submit_form();
        }
        if app.form.sending {
            ui.spinner();
            ui.label("Envoi en cours...");
        }
    });
}

fn text_row(ui: &mut Ui, label: &str, value: &mut String, hint: &str) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(value).desired_width(360.0).hint_text(hint));
    ui.end_row();
}
