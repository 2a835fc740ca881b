//! IvoirTech Panelists - panelist registration form and admin dashboard.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use ivoirtech_panelists as app;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use app::config::{AppConfig, ConfigLoadResult};
use app::session::{self, SessionStore};
use app::ui::App;

/// Panelist registration form and admin dashboard.
#[derive(Parser)]
#[command(name = "ivoirtech-panelists")]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// API server URL for this run, overriding the config file
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines reach the file
    let _log_guard = init_logging();

    tracing::info!("IvoirTech Panelists starting...");

    // Determine config path based on mode
    let config_path = if cli.dev {
        tracing::info!("Dev mode: loading config from current directory");
        PathBuf::from("config.toml")
    } else {
        AppConfig::default_path()
    };
    tracing::info!("Config path: {:?}", config_path);

    let mut startup_error = None;
    let mut config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            config
        }
        ConfigLoadResult::Missing => {
            tracing::info!("Config missing, writing defaults");
            let config = AppConfig::default();
            if let Err(e) = config.save(&config_path) {
                tracing::warn!("Failed to write default config: {}", e);
            }
            config
        }
        ConfigLoadResult::Invalid(e) => {
            tracing::warn!("Config invalid: {}", e);
            startup_error = Some(format!("Configuration invalide, valeurs par défaut utilisées: {e}"));
            AppConfig::default()
        }
    };

    if let Some(url) = cli.api_url {
        tracing::info!("API URL override: {}", url);
        config.api.base_url = url;
        config.validate().context("invalid --api-url")?;
    }
    tracing::info!("API server: {}", config.api.base_url);

    let session = match SessionStore::default_path() {
        Some(path) => SessionStore::restore(path),
        None => {
            tracing::warn!("No data directory, admin session will not persist");
            SessionStore::in_memory()
        }
    };

    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;

    let mut app = App::new(rt, config, config_path, session).context("failed to create API client")?;
    app.error_message = startup_error;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("IvoirTech Panelists")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "IvoirTech Panelists",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);

            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);

            app.apply_theme(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}

/// Log to stdout, and to a daily file in the data directory when available.
fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let Some(log_dir) = session::data_dir().map(|dir| dir.join("logs")) else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    };

    let appender = tracing_appender::rolling::daily(log_dir, "panelists.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Some(guard)
}
