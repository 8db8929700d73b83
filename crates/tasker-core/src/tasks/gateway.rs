//! Task gateway: session check plus dispatch to the configured backend.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::{LocalStore, NewTask, RemoteTasks, Task, TaskError, TaskPatch};
use crate::config::{Config, StorageMode};
use crate::session::{Session, SessionStore};

#[derive(Debug, Clone)]
enum Backend {
    Remote(RemoteTasks),
    Local(LocalStore),
}

/// CRUD over the signed-in user's tasks.
///
/// Holds a handle to the session store and reads the current session on every
/// call, so a logout elsewhere takes effect immediately.
#[derive(Debug, Clone)]
pub struct TaskGateway {
    sessions: SessionStore,
    backend: Backend,
}

impl TaskGateway {
    /// Gateway backed by the task API at `base_url`.
    pub fn remote(sessions: SessionStore, base_url: impl Into<String>) -> Self {
        Self {
            sessions,
            backend: Backend::Remote(RemoteTasks::new(base_url)),
        }
    }

    /// Gateway backed by per-user JSON files in `dir`.
    pub fn local(sessions: SessionStore, dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions,
            backend: Backend::Local(LocalStore::new(dir)),
        }
    }

    /// Builds the gateway selected by config.
    ///
    /// # Errors
    /// Returns an error if remote mode is selected without a usable API URL.
    pub fn from_config(config: &Config, sessions: SessionStore) -> Result<Self> {
        let mode = config.effective_storage_mode()?;
        let gateway = match mode {
            StorageMode::Remote => {
                let base_url = config.effective_api_url()?.context(
                    "Task API URL not configured. Set TASKER_API_URL or [api] base_url, \
                     or use [storage] mode = \"local\".",
                )?;
                Self::remote(sessions, base_url)
            }
            StorageMode::Local => Self {
                sessions,
                backend: Backend::Local(LocalStore::open_default()),
            },
        };
        tracing::debug!(mode = %mode, "Task gateway ready");
        Ok(gateway)
    }

    pub fn mode(&self) -> StorageMode {
        match self.backend {
            Backend::Remote(_) => StorageMode::Remote,
            Backend::Local(_) => StorageMode::Local,
        }
    }

    /// Every task owned by the current user.
    ///
    /// # Errors
    /// Returns `Unauthenticated` without a session, else any backend failure.
    pub async fn list(&self) -> Result<Vec<Task>, TaskError> {
        let session = self.session()?;
        match &self.backend {
            Backend::Remote(remote) => remote.list(&session.token).await,
            Backend::Local(local) => local.list(&session.username),
        }
    }

    /// # Errors
    /// Returns `Unauthenticated` without a session, `InvalidInput` for an
    /// empty name, else any backend failure.
    pub async fn create(&self, input: NewTask) -> Result<Task, TaskError> {
        let session = self.session()?;
        let task = match &self.backend {
            Backend::Remote(remote) => remote.create(&session.token, &input).await?,
            Backend::Local(local) => local.create(&session.username, input)?,
        };
        tracing::info!(id = %task.id, "Task created");
        Ok(task)
    }

    /// # Errors
    /// Returns `Unauthenticated` without a session, `InvalidInput` for an
    /// invalid patch, `NotFound` if the task is absent, else any backend failure.
    pub async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TaskError> {
        let session = self.session()?;
        let task = match &self.backend {
            Backend::Remote(remote) => remote.update(&session.token, id, patch).await?,
            Backend::Local(local) => local.update(&session.username, id, patch)?,
        };
        tracing::info!(id, "Task updated");
        Ok(task)
    }

    /// Deletes the task. Deleting an absent id succeeds.
    ///
    /// # Errors
    /// Returns `Unauthenticated` without a session, else any backend failure.
    pub async fn delete(&self, id: &str) -> Result<(), TaskError> {
        let session = self.session()?;
        match &self.backend {
            Backend::Remote(remote) => remote.delete(&session.token, id).await?,
            Backend::Local(local) => local.delete(&session.username, id)?,
        }
        tracing::info!(id, "Task deleted");
        Ok(())
    }

    fn session(&self) -> Result<Session, TaskError> {
        self.sessions.get().ok_or(TaskError::Unauthenticated)
    }
}
