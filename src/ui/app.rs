//! Main application UI.

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui::{self, Align, Layout};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::admin::{self, PanelistBoard};
use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::export::{self, ExportFormat};
use crate::models::{Panelist, Photo};
use crate::registration::{FormState, submit_registration};
use crate::session::{self, AdminSession, SessionStore};

use super::components::colors;
use super::{admin_panel, form_panel, login_panel};

/// Screen being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Form,
    Login,
    Admin,
}

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminTab {
    #[default]
    Statistics,
    Panelists,
}

impl AdminTab {
    pub fn name(&self) -> &'static str {
        match self {
            AdminTab::Statistics => "Statistiques",
            AdminTab::Panelists => "Panelistes",
        }
    }
}

/// Messages from async tasks to UI.
pub enum UiMessage {
    RegistrationFinished(Result<()>),
    LoginFinished(Result<AdminSession>),
    PanelistsLoaded { generation: u64, panelists: Vec<Panelist> },
    LoadFailed { generation: u64, error: AppError },
    PanelistDeleted { generation: u64, id: i64 },
    DeleteFailed { generation: u64, error: AppError },
    ApiTestResult(std::result::Result<(), String>),
}

/// Target for delete confirmation dialog.
#[derive(Clone)]
pub struct DeleteTarget {
    pub id: i64,
    pub name: String,
}

/// Main application state.
pub struct App {
    // Runtime and API
    pub rt: tokio::runtime::Runtime,
    pub api: ApiClient,

    // Message channel for async communication
    pub tx: mpsc::UnboundedSender<UiMessage>,
    pub rx: mpsc::UnboundedReceiver<UiMessage>,

    // Navigation
    pub screen: Screen,
    pub admin_tab: AdminTab,

    // Registration
    pub form: FormState,
    pub photo_uri: Option<String>,
    photo_generation: u32,

    // Login
    pub password_input: String,
    pub login_error: Option<String>,
    pub is_logging_in: bool,
    pub session: SessionStore,

    // Dashboard
    pub board: PanelistBoard,
    /// Bumped on every reset; list and delete results carry the value they started under.
    pub board_generation: u64,
    pub board_loaded: bool,
    pub is_loading: bool,
    pub is_deleting: bool,
    pub admin_error: Option<String>,

    // Configuration
    pub config: AppConfig,
    config_path: PathBuf,

    // Dialogs
    pub show_delete_confirm: bool,
    pub delete_target: Option<DeleteTarget>,
    pub error_message: Option<String>,
    pub success_message: Option<String>,

    // API server dialog
    pub api_dialog_open: bool,
    pub api_url_input: String,
    api_testing: bool,
    api_test_status: Option<std::result::Result<(), String>>,
}

impl App {
    pub fn new(
        rt: tokio::runtime::Runtime,
        config: AppConfig,
        config_path: PathBuf,
        session: SessionStore,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let api = ApiClient::new(&config.api.base_url, config.api.timeout())?;
        let api_url_input = config.api.base_url.clone();

        Ok(Self {
            rt,
            api,
            tx,
            rx,
            screen: Screen::default(),
            admin_tab: AdminTab::default(),
            form: FormState::default(),
            photo_uri: None,
            photo_generation: 0,
            password_input: String::new(),
            login_error: None,
            is_logging_in: false,
            session,
            board: PanelistBoard::default(),
            board_generation: 0,
            board_loaded: false,
            is_loading: false,
            is_deleting: false,
            admin_error: None,
            config,
            config_path,
            show_delete_confirm: false,
            delete_target: None,
            error_message: None,
            success_message: None,
            api_dialog_open: false,
            api_url_input,
            api_testing: false,
            api_test_status: None,
        })
    }

    /// Apply the configured light or dark theme.
    pub fn apply_theme(&self, ctx: &egui::Context) {
        let visuals = if self.config.ui.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);
    }

    /// Flip the theme and remember the choice.
    pub fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.config.ui.dark_mode = !self.config.ui.dark_mode;
        self.apply_theme(ctx);
        self.save_config();
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save(&self.config_path) {
            error!("Failed to save config: {}", e);
        }
    }

    /// Switch screens; the dashboard goes through the login gate.
    pub fn navigate(&mut self, screen: Screen) {
        match screen {
            Screen::Admin => self.open_admin(),
            other => self.screen = other,
        }
    }

    /// Enter the dashboard, or the login screen when no session is active.
    ///
    /// Each entry fetches the list again.
    pub fn open_admin(&mut self) {
        if !self.session.is_authenticated() {
            self.screen = Screen::Login;
            return;
        }
        self.screen = Screen::Admin;
        if !self.is_loading {
            self.load_panelists();
        }
    }

    /// Pick a photo from disk and show its preview.
    ///
    /// A rejected file keeps the previous selection.
    pub fn pick_photo(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png"])
            .pick_file()
        else {
            return;
        };

        match Photo::load(&path) {
            Ok(photo) => {
                self.forget_photo_preview(ctx);
                self.photo_generation += 1;
                let uri = format!("bytes://photo-{}-{}", self.photo_generation, photo.file_name);
                ctx.include_bytes(uri.clone(), photo.bytes.clone());
                self.photo_uri = Some(uri);
                self.form.form.photo = Some(photo);
                self.form.error = None;
            }
            Err(e) => {
                warn!("Photo rejected {:?}: {}", path, e);
                self.form.fail(&e);
            }
        }
    }

    fn forget_photo_preview(&mut self, ctx: &egui::Context) {
        if let Some(uri) = self.photo_uri.take() {
            ctx.forget_image(&uri);
        }
    }

    /// Validate and send the registration form.
    pub fn submit_form(&mut self) {
        if self.form.sending {
            return;
        }
        self.form.start_sending();

        let api = self.api.clone();
        let form = self.form.form.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let result = submit_registration(&api, &form).await;
            let _ = tx.send(UiMessage::RegistrationFinished(result));
        });
    }

    /// Exchange the typed password for a session.
    pub fn login(&mut self) {
        if self.is_logging_in {
            return;
        }
        self.is_logging_in = true;
        self.login_error = None;

        let api = self.api.clone();
        let password = std::mem::take(&mut self.password_input);
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let result = session::sign_in(&api, &password).await;
            let _ = tx.send(UiMessage::LoginFinished(result));
        });
    }

    /// End the session locally and revoke it on the server.
    pub fn logout(&mut self) {
        if let Some(ended) = self.session.end() {
            let api = self.api.clone();
            self.rt.spawn(async move {
                session::sign_out(&api, &ended.token).await;
            });
            info!("Admin logged out");
        }
        self.reset_board();
        self.login_error = None;
        self.screen = Screen::Login;
    }

    /// Fetch the full panelist list.
    pub fn load_panelists(&mut self) {
        let Some(token) = self.session.token() else {
            self.expire_session();
            return;
        };
        self.is_loading = true;
        self.admin_error = None;

        let api = self.api.clone();
        let tx = self.tx.clone();
        let generation = self.board_generation;

        self.rt.spawn(async move {
            let msg = match admin::fetch_panelists(&api, &token).await {
                Ok(panelists) => UiMessage::PanelistsLoaded { generation, panelists },
                Err(error) => UiMessage::LoadFailed { generation, error },
            };
            let _ = tx.send(msg);
        });
    }

    /// Delete a panelist on the server.
    pub fn delete_panelist(&mut self, id: i64) {
        let Some(token) = self.session.token() else {
            self.expire_session();
            return;
        };
        self.is_deleting = true;
        self.admin_error = None;

        let api = self.api.clone();
        let tx = self.tx.clone();
        let generation = self.board_generation;

        self.rt.spawn(async move {
            let msg = match admin::delete_panelist(&api, &token, id).await {
                Ok(id) => UiMessage::PanelistDeleted { generation, id },
                Err(error) => UiMessage::DeleteFailed { generation, error },
            };
            let _ = tx.send(msg);
        });
    }

    /// Write the loaded list to a user-chosen file.
    pub fn export(&mut self, format: ExportFormat) {
        let Some(path) = export::show_save_dialog(format, self.config.export.directory.as_deref()) else {
            return;
        };

        match export::export_panelists(format, self.board.all(), &path) {
            Ok(()) => {
                self.success_message = Some(format!("Export terminé: {}", path.display()));
            }
            Err(e) => {
                error!("Export to {:?} failed: {}", path, e);
                self.error_message = Some(e.user_message());
            }
        }
    }

    /// Forget the list; requests still in flight become stale.
    fn reset_board(&mut self) {
        self.board_generation += 1;
        self.board = PanelistBoard::default();
        self.board_loaded = false;
        self.is_loading = false;
        self.is_deleting = false;
        self.admin_error = None;
        self.show_delete_confirm = false;
        self.delete_target = None;
    }

    /// Drop a session the server or the clock no longer honours.
    fn expire_session(&mut self) {
        self.session.end();
        self.reset_board();
        self.login_error = Some(AppError::Unauthorized.user_message());
        self.screen = Screen::Login;
    }

    fn admin_failed(&mut self, error: AppError, fallback: &str) {
        match error {
            AppError::Unauthorized => self.expire_session(),
            AppError::Rejected { .. } => self.admin_error = Some(fallback.to_string()),
            other => self.admin_error = Some(other.user_message()),
        }
    }

    /// Start API server test.
    fn test_api_connection(&mut self) {
        let url = self.api_url_input.trim().to_string();
        if url.is_empty() {
            self.api_test_status = Some(Err("L'URL est vide".to_string()));
            return;
        }
        self.api_testing = true;
        self.api_test_status = None;

        let timeout = self.config.api.timeout();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let result = check_api_server(&url, timeout).await;
            let _ = tx.send(UiMessage::ApiTestResult(result));
        });
    }

    /// Save the API server URL. Returns whether it was accepted.
    fn save_api_config(&mut self) -> bool {
        let mut candidate = self.config.clone();
        candidate.api.base_url = self.api_url_input.trim().to_string();
        if let Err(e) = candidate.validate() {
            self.api_test_status = Some(Err(e.to_string()));
            return false;
        }

        let api = match ApiClient::new(&candidate.api.base_url, candidate.api.timeout()) {
            Ok(api) => api,
            Err(e) => {
                self.api_test_status = Some(Err(e.user_message()));
                return false;
            }
        };

        // The session belongs to the previous server
        if candidate.api.base_url != self.config.api.base_url {
            info!("API server changed to {}", candidate.api.base_url);
            self.session.end();
            self.reset_board();
            if self.screen == Screen::Admin {
                self.screen = Screen::Login;
            }
        }

        self.api = api;
        self.config = candidate;
        self.save_config();
        true
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self, ctx: &egui::Context) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg, ctx);
        }
    }

    fn handle_message(&mut self, msg: UiMessage, ctx: &egui::Context) {
        match msg {
            UiMessage::RegistrationFinished(result) => {
                if let Err(e) = &result {
                    warn!("Registration failed: {}", e);
                }
                let succeeded = result.is_ok();
                self.form.finish(result);
                if succeeded {
                    self.forget_photo_preview(ctx);
                }
            }
            UiMessage::LoginFinished(Ok(session)) => {
                self.is_logging_in = false;
                self.session.begin(session);
                self.open_admin();
            }
            UiMessage::LoginFinished(Err(e)) => {
                self.is_logging_in = false;
                warn!("Admin login refused: {}", e);
                self.login_error = Some(e.user_message());
            }
            UiMessage::PanelistsLoaded { generation, .. }
            | UiMessage::LoadFailed { generation, .. }
            | UiMessage::PanelistDeleted { generation, .. }
            | UiMessage::DeleteFailed { generation, .. }
                if generation != self.board_generation =>
            {
                debug!("Dropping dashboard result from ended session {}", generation);
            }
            UiMessage::PanelistsLoaded { panelists, .. } => {
                self.is_loading = false;
                self.board.replace(panelists);
                self.board_loaded = true;
            }
            UiMessage::LoadFailed { error: e, .. } => {
                self.is_loading = false;
                error!("Loading panelists failed: {}", e);
                self.admin_failed(e, "Erreur lors du chargement des panelistes");
            }
            UiMessage::PanelistDeleted { id, .. } => {
                self.is_deleting = false;
                if self.board.remove(id) {
                    self.success_message = Some("Paneliste supprimé avec succès".to_string());
                }
            }
            UiMessage::DeleteFailed { error: e, .. } => {
                self.is_deleting = false;
                error!("Deleting panelist failed: {}", e);
                self.admin_failed(e, "Erreur lors de la suppression du paneliste");
            }
            UiMessage::ApiTestResult(result) => {
                self.api_testing = false;
                self.api_test_status = Some(result);
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.form.sending || self.is_logging_in || self.is_loading || self.is_deleting || self.api_testing
    }

    /// Render menu bar.
    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("Navigation", |ui| {
                    if ui.button("Formulaire").clicked() {
                        self.screen = Screen::Form;
                        ui.close();
                    }
                    if ui.button("Accès Admin").clicked() {
                        self.open_admin();
                        ui.close();
                    }
                    ui.separator();
                    let signed_in = self.session.is_authenticated();
                    if ui.add_enabled(signed_in, egui::Button::new("Déconnexion")).clicked() {
                        self.logout();
                        ui.close();
                    }
                });
                ui.menu_button("Outils", |ui| {
                    if ui.button("Serveur API").clicked() {
                        self.api_dialog_open = true;
                        self.api_url_input = self.config.api.base_url.clone();
                        self.api_test_status = None;
                        ui.close();
                    }
                });
            });
        });
    }

    /// Render status bar (display only, no interaction).
    fn show_status_bar(&mut self, ctx: &egui::Context) {
        let session_text = match self.session.active() {
            Some(s) => format!(
                "Session admin jusqu'à {}",
                s.expires_at.with_timezone(&chrono::Local).format("%H:%M")
            ),
            None => "Non connecté".to_string(),
        };

        egui::TopBottomPanel::bottom("status_bar")
            .min_height(28.0)
            .show(ctx, |ui| {
                ui.disable();
                ui.horizontal(|ui| {
                    if self.is_busy() {
                        ui.spinner();
                    }
                    ui.colored_label(colors::NEUTRAL, format!("Serveur: {}", self.api.base_url()));

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(session_text);
                    });
                });
            });
    }

    /// Render API server configuration dialog.
    fn show_api_dialog(&mut self, ctx: &egui::Context) {
        if !self.api_dialog_open {
            return;
        }

        let mut open = true;
        egui::Window::new("Serveur API")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.add_space(10.0);

                egui::Grid::new("api_grid")
                    .num_columns(2)
                    .spacing([20.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("URL du serveur:");
                        ui.add(egui::TextEdit::singleline(&mut self.api_url_input).desired_width(280.0));
                        ui.end_row();
                    });

                ui.add_space(15.0);

                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!self.api_testing, egui::Button::new("Tester la connexion"))
                        .clicked()
                    {
                        self.test_api_connection();
                    }

                    ui.add_space(10.0);

                    if self.api_testing {
                        ui.spinner();
                        ui.label("Test en cours...");
                    } else if let Some(result) = &self.api_test_status {
                        match result {
                            Ok(()) => {
                                ui.colored_label(colors::SUCCESS, "Connexion réussie");
                            }
                            Err(e) => {
                                ui.colored_label(colors::ERROR, format!("Échec: {}", e));
                            }
                        }
                    }
                });

                ui.add_space(15.0);
                ui.separator();
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    if ui.button("Annuler").clicked() {
                        self.api_dialog_open = false;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button("Enregistrer").clicked() && self.save_api_config() {
                            self.api_dialog_open = false;
                        }
                    });
                });
            });

        if !open {
            self.api_dialog_open = false;
        }
    }

    /// Render modal dialogs (error, success, delete confirmation).
    fn show_dialogs(&mut self, ctx: &egui::Context) {
        // Error dialog
        if let Some(ref error) = self.error_message.clone() {
            egui::Window::new("Erreur")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::ERROR, error);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.error_message = None;
                    }
                });
        }

        // Success dialog
        if let Some(ref msg) = self.success_message.clone() {
            egui::Window::new("Succès")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.colored_label(colors::SUCCESS, msg);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.success_message = None;
                    }
                });
        }

        // Delete confirmation dialog
        if self.show_delete_confirm
            && let Some(target) = self.delete_target.clone()
        {
            egui::Window::new("Supprimer le paneliste")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("Voulez-vous vraiment supprimer {} ?", target.name));
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Annuler").clicked() {
                            self.show_delete_confirm = false;
                            self.delete_target = None;
                        }
                        if ui.button("Supprimer").clicked() {
                            self.show_delete_confirm = false;
                            self.delete_target = None;
                            info!("Deleting panelist {} ({})", target.id, target.name);
                            self.delete_panelist(target.id);
                        }
                    });
                });
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll async results
        self.poll_async_results(ctx);

        // Request repaint during async operations
        if self.is_busy() {
            ctx.request_repaint();
        }

        // Session may expire while the dashboard is open
        if self.screen == Screen::Admin && !self.session.is_authenticated() {
            self.expire_session();
        }

        self.show_menu_bar(ctx);
        self.show_status_bar(ctx);
        self.show_api_dialog(ctx);
        self.show_dialogs(ctx);

        // Main content
        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Form => {
                if let Some(next) = form_panel::show(self, ui) {
                    self.navigate(next);
                }
            }
            Screen::Login => {
                if login_panel::show(self, ui) {
                    self.screen = Screen::Form;
                }
            }
            Screen::Admin => {
                if let Some(next) = admin_panel::show(self, ui) {
                    self.navigate(next);
                }
            }
        });
    }
}

/// Check that an API server answers at this URL.
async fn check_api_server(url: &str, timeout: Duration) -> std::result::Result<(), String> {
    let client = ApiClient::new(url, timeout).map_err(|e| e.user_message())?;
    match client.test_connection().await {
        Ok(true) => Ok(()),
        Ok(false) => Err("Le serveur a répondu avec une erreur".to_string()),
        Err(e) => Err(e.user_message()),
    }
}
