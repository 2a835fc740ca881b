//! `config.toml`: API server address, request timeout, theme and export folder.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const MAX_TIMEOUT_SECS: u64 = 600;

/// Outcome of reading `config.toml` at startup.
#[derive(Debug)]
pub enum ConfigLoadResult {
    Loaded(AppConfig),
    /// No file yet, first launch.
    Missing,
    Invalid(ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("lecture impossible: {0}")]
    Read(#[from] std::io::Error),

    #[error("fichier mal formé: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("écriture impossible: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Where the panelist API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server root, without the `/api` prefix (e.g. "https://panel.example.ci").
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub dark_mode: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Folder the save dialog opens in. Empty means the OS default.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// `config.toml` beside the executable.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        exe_dir.unwrap_or_else(|| PathBuf::from(".")).join("config.toml")
    }

    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }
        match Self::read(path) {
            Ok(config) => ConfigLoadResult::Loaded(config),
            Err(e) => ConfigLoadResult::Invalid(e),
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the server address and timeout. Messages are shown to the user as is.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        let problem = if url.is_empty() {
            Some("l'adresse du serveur API est vide".to_string())
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            Some(format!("l'adresse du serveur API doit commencer par http:// ou https:// ({url})"))
        } else if !(1..=MAX_TIMEOUT_SECS).contains(&self.api.timeout_secs) {
            Some(format!(
                "le délai d'attente doit être compris entre 1 et {MAX_TIMEOUT_SECS} secondes ({})",
                self.api.timeout_secs
            ))
        } else {
            None
        };
        match problem {
            Some(message) => Err(ConfigError::Validation(message)),
            None => Ok(()),
        }
    }

    /// Write the file, creating its folder if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, text)?;
        tracing::debug!("Config written to {:?}", path);
        Ok(())
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_message(config: &AppConfig) -> String {
        match config.validate() {
            Err(ConfigError::Validation(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_points_at_local_server() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_blank_server_address_is_refused() {
        let mut config = AppConfig::default();
        config.api.base_url = "   ".to_string();
        assert_eq!(validation_message(&config), "l'adresse du serveur API est vide");
    }

    #[test]
    fn test_server_address_needs_http_scheme() {
        let mut config = AppConfig::default();
        config.api.base_url = "panel.example.ci".to_string();
        assert!(validation_message(&config).contains("http:// ou https://"));

        config.api.base_url = "https://panel.example.ci".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_range() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = 0;
        assert!(validation_message(&config).contains("entre 1 et 600"));

        config.api.timeout_secs = 601;
        assert!(config.validate().is_err());

        config.api.timeout_secs = 600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config: AppConfig = toml::from_str("[api]\nbase_url = \"https://panel.example.ci\"\n").unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.ui.dark_mode);
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn test_saved_server_address_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings").join("config.toml");

        let mut config = AppConfig::default();
        config.api.base_url = "https://panel.example.ci".to_string();
        config.ui.dark_mode = false;
        config.save(&path).unwrap();

        match AppConfig::try_load(&path) {
            ConfigLoadResult::Loaded(loaded) => {
                assert_eq!(loaded.api.base_url, "https://panel.example.ci");
                assert!(!loaded.ui.dark_mode);
            }
            other => panic!("unexpected load result: {other:?}"),
        }
    }

    #[test]
    fn test_first_launch_has_no_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppConfig::try_load(&dir.path().join("config.toml")),
            ConfigLoadResult::Missing
        ));
    }

    #[test]
    fn test_bad_server_address_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"panel.example.ci\"\n").unwrap();
        assert!(matches!(
            AppConfig::try_load(&path),
            ConfigLoadResult::Invalid(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();
        assert!(matches!(AppConfig::try_load(&path), ConfigLoadResult::Invalid(ConfigError::Parse(_))));
    }
}
