/// Durable session storage
///
/// Persists the current token pair and cached user as a JSON file so a
/// session survives process restarts. A missing or corrupt file reads as
/// "logged out" rather than an error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::users::AuthUser;

/// The client-held session: the current token pair plus the cached user
/// projection. Replaced wholesale on refresh, destroyed on logout or
/// failed refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Per-user data directory default, e.g. `~/.local/share/menu-auth/session.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("menu-auth")
            .join("session.json")
    }

    /// Load the persisted session, if any.
    pub fn load(&self) -> Option<Session> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt session file");
                None
            }
        }
    }

    /// Persist the session, creating parent directories as needed.
    pub fn save(&self, session: &Session) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "Failed to create session directory");
                return;
            }
        }

        match serde_json::to_string(session) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&self.path, contents) {
                    tracing::warn!(error = %e, "Failed to persist session");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize session");
            }
        }
    }

    /// Remove the persisted session.
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, "Failed to remove session file");
            }
        }
    }
}
