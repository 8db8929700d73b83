//! Session storage.
//!
//! Holds the authenticated session and the pending sign-up identity. The store
//! is a shared handle: clones see the same state, so the task gateway reads the
//! live token at request time instead of holding its own copy.
//!
//! When opened with a path, state is persisted to `<base>/session.json` with
//! restricted permissions (0600). Tokens are never logged in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Session file name inside the Tasker home directory.
const SESSION_FILE: &str = "session.json";

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer credential sent to the task API (the provider's ID token).
    pub token: String,
    /// Provider access token, used for attribute lookup and global sign-out.
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// Unique identity name; keys the local task store.
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Name shown in the header: display name, else email, else "User".
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("User")
    }
}

/// Identity created by sign-up and awaiting email verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingIdentity {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_sub: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
    /// Where the provider sent the verification code (masked by the provider).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session: Option<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending: Option<PendingIdentity>,
}

/// Shared handle to the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
    path: Option<Arc<PathBuf>>,
}

impl SessionStore {
    /// Creates a store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Returns the default session file path.
    pub fn default_path() -> PathBuf {
        paths::tasker_home().join(SESSION_FILE)
    }

    /// Opens the store at the default location.
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read or parsed.
    pub fn open_default() -> Result<Self> {
        Self::open(&Self::default_path())
    }

    /// Opens a persistent store, loading existing state if the file exists.
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read session from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse session from {}", path.display()))?
        } else {
            SessionState::default()
        };

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            path: Some(Arc::new(path.to_path_buf())),
        })
    }

    /// Returns the current session, if any.
    pub fn get(&self) -> Option<Session> {
        self.read(|s| s.session.clone())
    }

    /// Returns the bearer token of the current session, if any.
    pub fn token(&self) -> Option<String> {
        self.read(|s| s.session.as_ref().map(|session| session.token.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|s| s.session.is_some())
    }

    /// Stores a session, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the session file cannot be written.
    pub fn set(&self, session: Session) -> Result<()> {
        self.write(|s| s.session = Some(session))
    }

    /// Removes the session. Succeeds when nothing is stored.
    ///
    /// # Errors
    /// Returns an error if the session file cannot be written.
    pub fn clear(&self) -> Result<()> {
        self.write(|s| s.session = None)
    }

    pub fn pending(&self) -> Option<PendingIdentity> {
        self.read(|s| s.pending.clone())
    }

    /// # Errors
    /// Returns an error if the session file cannot be written.
    pub fn set_pending(&self, pending: PendingIdentity) -> Result<()> {
        self.write(|s| s.pending = Some(pending))
    }

    /// # Errors
    /// Returns an error if the session file cannot be written.
    pub fn clear_pending(&self) -> Result<()> {
        self.write(|s| s.pending = None)
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut SessionState)) -> Result<()> {
        let snapshot = {
            let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard);
            guard.clone()
        };
        match &self.path {
            Some(path) => save(path, &snapshot),
            None => Ok(()),
        }
    }
}

/// Writes the session file with restricted permissions (0600).
fn save(path: &Path, state: &SessionState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let contents = serde_json::to_string_pretty(state).context("Failed to serialize session")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}
