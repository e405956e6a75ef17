//! Session ownership and persistence.
//!
//! The [`SessionStore`] owns the in-memory session, the persisted copy on
//! disk, and the [`CredentialCell`] the gateway client reads the bearer
//! token from. It is constructed once at process start and handed to
//! whoever needs it; there is no ambient global.
//!
//! The persisted file is `session.json` under the mailsweep home, written
//! with restricted permissions (0600). The credential is never logged.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::UserProfile;

/// Shared read slot for the current bearer credential.
///
/// The store writes it on login/logout/restore; the gateway client reads it
/// per request. Cloning shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct CredentialCell(Arc<RwLock<Option<String>>>);

impl CredentialCell {
    pub fn get(&self) -> Option<String> {
        self.0.read().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, credential: Option<String>) {
        if let Ok(mut guard) = self.0.write() {
            *guard = credential;
        }
    }
}

/// In-memory session state.
///
/// Invariant: `credential` and `user` are both present or both absent.
/// While `is_loading` is true the credentials are unknown and routing
/// decisions must wait.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub credential: Option<String>,
    pub user: Option<UserProfile>,
    pub is_loading: bool,
}

impl Session {
    /// True once a verified (or freshly logged-in) session is held.
    pub fn is_resolved(&self) -> bool {
        !self.is_loading && self.user.is_some()
    }
}

/// On-disk form: credential plus the last-known user record.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    credential: String,
    user: UserProfile,
}

/// Owns the session lifecycle: restore at start, login after a code
/// exchange, logout on user action or an unauthorized response.
///
/// Disk writes are separated from state transitions so the reducer can
/// stay free of I/O: `login`/`logout` mutate memory only, and the caller
/// follows up with [`SessionStore::save_to_disk`] / [`SessionStore::clear_disk`].
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    credentials: CredentialCell,
    session: Session,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: CredentialCell::default(),
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handle to the credential slot, for wiring into the gateway client.
    pub fn credential_cell(&self) -> CredentialCell {
        self.credentials.clone()
    }

    /// First phase of restore: read the persisted session and install it
    /// optimistically with `is_loading = true`, returning the credential so
    /// the caller can run the "who am I" verification. Returns `None` (and
    /// leaves the session empty, not loading) when nothing is persisted;
    /// in that case no verification call must be made.
    pub fn begin_restore(&mut self) -> Option<String> {
        match self.read_disk() {
            Some(persisted) => {
                self.credentials.set(Some(persisted.credential.clone()));
                self.session = Session {
                    credential: Some(persisted.credential.clone()),
                    user: Some(persisted.user),
                    is_loading: true,
                };
                Some(persisted.credential)
            }
            None => {
                self.session = Session::default();
                None
            }
        }
    }

    /// Second phase of restore. On success the authoritative user record
    /// replaces the persisted one; on failure (expired credential, network
    /// error) the session is cleared entirely, no partial session survives.
    pub fn finish_restore(&mut self, verified: Result<UserProfile, String>) {
        match verified {
            Ok(user) => {
                self.session.user = Some(user);
                self.session.is_loading = false;
            }
            Err(reason) => {
                tracing::warn!(reason, "session verification failed, clearing session");
                self.logout();
            }
        }
    }

    /// Installs a fresh session. Idempotent.
    pub fn login(&mut self, credential: String, user: UserProfile) {
        self.credentials.set(Some(credential.clone()));
        self.session = Session {
            credential: Some(credential),
            user: Some(user),
            is_loading: false,
        };
    }

    /// Clears the in-memory session and credential slot. Idempotent and
    /// safe to call when already logged out.
    pub fn logout(&mut self) {
        self.credentials.set(None);
        self.session = Session::default();
    }

    /// Writes the current session to disk with restricted permissions.
    /// No-op when there is no resolved session to persist.
    pub fn save_to_disk(&self) -> Result<()> {
        let (Some(credential), Some(user)) = (&self.session.credential, &self.session.user) else {
            return Ok(());
        };
        let persisted = PersistedSession {
            credential: credential.clone(),
            user: user.clone(),
        };
        let contents =
            serde_json::to_string_pretty(&persisted).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Removes the persisted session file, if any.
    pub fn clear_disk(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    fn read_disk(&self) -> Option<PersistedSession> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(persisted) => Some(persisted),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring unreadable session file"
                );
                None
            }
        }
    }
}
