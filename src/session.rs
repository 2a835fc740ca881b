//! Admin session lifecycle.
//!
//! A session is created only by a successful server login and ends on
//! explicit logout, on expiry, or when the server refuses its token. The
//! current session is persisted to the user data directory so it survives a
//! restart until it expires.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::client::PanelistApi;
use crate::error::{AppError, Result};

/// Server-issued admin credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide holder of the admin session.
#[derive(Debug, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    current: Option<AdminSession>,
}

impl SessionStore {
    /// Store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Location of the persisted session file, if the platform has a data dir.
    pub fn default_path() -> Option<PathBuf> {
        data_dir().map(|dir| dir.join("session.json"))
    }

    /// Load the persisted session, discarding it if unreadable or expired.
    pub fn restore(path: PathBuf) -> Self {
        let mut store = Self {
            path: Some(path),
            current: None,
        };

        let Some(path) = store.path.as_deref() else {
            return store;
        };
        if !path.exists() {
            return store;
        }

        match read_session(path) {
            Ok(session) if !session.is_expired_at(Utc::now()) => {
                info!("Restored admin session (expires {})", session.expires_at);
                store.current = Some(session);
            }
            Ok(_) => {
                info!("Persisted admin session expired, discarding");
                store.end();
            }
            Err(e) => {
                warn!("Ignoring unreadable session file: {e}");
                store.end();
            }
        }

        store
    }

    /// Start a session after a successful login.
    pub fn begin(&mut self, session: AdminSession) {
        if let Some(path) = &self.path
            && let Err(e) = write_session(path, &session)
        {
            warn!("Failed to persist admin session: {e}");
        }
        self.current = Some(session);
    }

    /// The current session, if one exists and has not expired.
    ///
    /// An expired session is torn down as a side effect.
    pub fn active(&mut self) -> Option<&AdminSession> {
        self.active_at(Utc::now())
    }

    pub fn active_at(&mut self, now: DateTime<Utc>) -> Option<&AdminSession> {
        if self.current.as_ref().is_some_and(|s| s.is_expired_at(now)) {
            info!("Admin session expired");
            self.end();
        }
        self.current.as_ref()
    }

    /// Bearer token of the active session.
    pub fn token(&mut self) -> Option<String> {
        self.active().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&mut self) -> bool {
        self.active().is_some()
    }

    /// Tear the session down and remove its persisted copy.
    pub fn end(&mut self) -> Option<AdminSession> {
        if let Some(path) = &self.path
            && path.exists()
            && let Err(e) = std::fs::remove_file(path)
        {
            warn!("Failed to remove session file: {e}");
        }
        self.current.take()
    }
}

/// Exchange the admin password for a session.
///
/// An empty password is refused locally without contacting the server.
pub async fn sign_in<A: PanelistApi>(api: &A, password: &str) -> Result<AdminSession> {
    if password.is_empty() {
        return Err(AppError::validation("Veuillez saisir le mot de passe"));
    }
    let session = api.login(password).await?;
    info!("Admin login accepted");
    Ok(session)
}

/// Revoke the token on the server. Failures are logged, never surfaced:
/// the local session is torn down regardless.
pub async fn sign_out<A: PanelistApi>(api: &A, token: &str) {
    if let Err(e) = api.logout(token).await {
        warn!("Server logout failed: {e}");
    }
}

/// Per-user data directory (session file, logs).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("ci", "MTND", "IvoirTech Panelists").map(|dirs| dirs.data_dir().to_path_buf())
}

fn read_session(path: &Path) -> Result<AdminSession> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| AppError::parse(e.to_string()))
}

fn write_session(path: &Path, session: &AdminSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string(session).map_err(|e| AppError::parse(e.to_string()))?;
    std::fs::write(path, content)?;
    Ok(())
}
