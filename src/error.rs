//! Error types and handling.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request rejected with status {status}")]
    Rejected { status: u16 },

    /// Email already registered
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Admin password refused by the server
    #[error("Admin login failed: invalid credentials")]
    InvalidCredentials,

    /// No admin session, or the server refused the token
    #[error("Admin session missing or expired")]
    Unauthorized,

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV, Excel or PDF export error
    #[error("Export error: {0}")]
    Export(String),

    /// Local validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error with message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an export error with message
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Text shown inline to the user.
    ///
    /// Server error bodies never reach this message; they are logged where
    /// the response is read.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::DuplicateEmail(_) => "Cet email est déjà enregistré".to_string(),
            Self::Http(e) => format!("Erreur de connexion au serveur: {e}"),
            Self::Rejected { .. } => "Erreur lors de la soumission du formulaire".to_string(),
            Self::InvalidCredentials => "Mot de passe incorrect".to_string(),
            Self::Unauthorized => "Session expirée, veuillez vous reconnecter".to_string(),
            Self::Parse(msg) => format!("Réponse du serveur invalide: {msg}"),
            Self::Config(msg) => format!("Erreur de configuration: {msg}"),
            Self::Io(e) => format!("Erreur de fichier: {e}"),
            Self::Export(msg) => format!("Échec de l'export: {msg}"),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        Self::Export(e.to_string())
    }
}
