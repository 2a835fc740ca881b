//! Admin dashboard: statistics tab and the paginated panelist table.

use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{
    ARROWS_CLOCKWISE, CARET_LEFT, CARET_RIGHT, FILE_CSV, FILE_PDF, FILE_XLS, PENCIL, SIGN_OUT, TRASH,
};

use super::app::{AdminTab, App, DeleteTarget, Screen};
use super::components::{
    action_button, back_button, chart_placeholder, colors, danger_action_button, panel_header, stat_card,
    styled_button_with_icon,
};
use crate::export::ExportFormat;

/// Show the admin dashboard.
///
/// Returns `Some(screen)` if navigation is requested.
pub fn show(app: &mut App, ui: &mut Ui) -> Option<Screen> {
    let mut next_screen = None;

    if back_button(ui, "Retour au formulaire") {
        next_screen = Some(Screen::Form);
    }

    panel_header(ui, "Tableau de bord");

    // Toolbar
    ui.horizontal(|ui| {
        for tab in [AdminTab::Statistics, AdminTab::Panelists] {
            ui.selectable_value(&mut app.admin_tab, tab, RichText::new(tab.name()).size(15.0));
        }

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if styled_button_with_icon(ui, SIGN_OUT, "Déconnexion").clicked() {
                app.logout();
            }
            ui.add_space(10.0);
            if ui
                .add_enabled(
                    !app.is_loading,
                    egui::Button::new(format!("{ARROWS_CLOCKWISE}  Actualiser")).min_size(egui::vec2(0.0, 32.0)),
                )
                .clicked()
            {
                app.load_panelists();
            }
            if app.is_loading || app.is_deleting {
                ui.spinner();
            }
        });
    });

    ui.add_space(15.0);

    if let Some(error) = &app.admin_error {
        ui.colored_label(colors::ERROR, error);
        ui.add_space(10.0);
    }

    match app.admin_tab {
        AdminTab::Statistics => show_statistics(app, ui),
        AdminTab::Panelists => show_panelists(app, ui),
    }

    next_screen
}

fn show_statistics(app: &mut App, ui: &mut Ui) {
    let summary = app.board.summary();

    ui.horizontal(|ui| {
        stat_card(
            ui,
            "Total panelistes",
            &summary.total.to_string(),
            "Inscriptions enregistrées",
        );
        stat_card(
            ui,
            "Dernier inscrit",
            summary.latest.as_deref().unwrap_or("-"),
            "Dernier enregistrement reçu",
        );
        stat_card(
            ui,
            "Domaines couverts",
            &summary.distinct_domains.to_string(),
            "Domaines d'expertise distincts",
        );
    });

    ui.add_space(20.0);

    let width = ((ui.available_width() - 60.0) / 2.0).max(250.0);
    let size = egui::vec2(width, 220.0);
    ui.horizontal(|ui| {
        chart_placeholder(ui, "Répartition par domaine", size);
        chart_placeholder(ui, "Inscriptions mensuelles", size);
    });
}

fn show_panelists(app: &mut App, ui: &mut Ui) {
    // Export actions
    ui.horizontal(|ui| {
        if styled_button_with_icon(ui, FILE_CSV, "Exporter CSV").clicked() {
            app.export(ExportFormat::Csv);
        }
        ui.add_space(10.0);
        if styled_button_with_icon(ui, FILE_XLS, "Exporter Excel").clicked() {
            app.export(ExportFormat::Excel);
        }
        ui.add_space(10.0);
        if styled_button_with_icon(ui, FILE_PDF, "Exporter PDF").clicked() {
            app.export(ExportFormat::Pdf);
        }
    });

    ui.add_space(10.0);
    show_pagination(app, ui);
    ui.add_space(10.0);

    if app.board.is_empty() {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            let text = if app.is_loading {
                "Chargement..."
            } else {
                "Aucun paneliste enregistré"
            };
            ui.label(RichText::new(text).weak());
        });
        return;
    }

    let mut delete_request = None;

    ScrollArea::both().id_salt("panelists_scroll").show(ui, |ui| {
        ui.add_space(4.0);
        egui::Grid::new("panelists_grid")
            .num_columns(8)
            .striped(true)
            .min_col_width(60.0)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                // Header
                ui.strong("Nom");
                ui.strong("Email");
                ui.strong("Contact");
                ui.strong("Poste");
                ui.strong("Organisation");
                ui.strong("Domaines");
                ui.strong("Expérience");
                ui.strong("Actions");
                ui.end_row();

                // Data rows
                for p in app.board.page() {
                    ui.label(p.display_name());
                    ui.label(&p.email);
                    ui.label(&p.contact);
                    ui.label(&p.poste);
                    ui.label(&p.organisation);
                    ui.label(p.domains_summary()).on_hover_text(p.domains_full());
                    ui.label(p.experience_label());
                    ui.horizontal(|ui| {
                        action_button(ui, false, PENCIL, "Modification non disponible");
                        if danger_action_button(ui, TRASH, "Supprimer").clicked() {
                            delete_request = Some(DeleteTarget {
                                id: p.id,
                                name: p.display_name(),
                            });
                        }
                    });
                    ui.end_row();
                }
            });
    });

    if let Some(target) = delete_request
        && !app.is_deleting
    {
        app.delete_target = Some(target);
        app.show_delete_confirm = true;
    }
}

fn show_pagination(app: &mut App, ui: &mut Ui) {
    let total = app.board.len();
    let range = app.board.pager.range(total);

    ui.horizontal(|ui| {
        if total > 0 {
            ui.label(format!("{}-{} sur {} panelistes", range.start + 1, range.end, total));
        } else {
            ui.label("0 paneliste");
        }

        ui.add_space(20.0);
        ui.separator();
        ui.add_space(10.0);

        if ui
            .add_enabled(app.board.pager.has_prev(), egui::Button::new(CARET_LEFT))
            .on_hover_text("Page précédente")
            .clicked()
        {
            app.board.prev_page();
        }

        ui.label(format!(
            "Page {page} sur {pages}",
            page = app.board.pager.current + 1,
            pages = app.board.page_count().max(1)
        ));

        if ui
            .add_enabled(app.board.pager.has_next(total), egui::Button::new(CARET_RIGHT))
            .on_hover_text("Page suivante")
            .clicked()
        {
            app.board.next_page();
        }
    });
}
