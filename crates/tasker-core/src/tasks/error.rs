//! Task gateway errors.

use std::fmt;

use serde_json::Value;

/// Failure of a task gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// No active session.
    Unauthenticated,
    /// Input rejected before any I/O.
    InvalidInput(String),
    /// Mutation target is absent from the collection.
    NotFound { id: String },
    /// Task API answered with a non-2xx status.
    Remote { status_code: u16, message: String },
    /// Request never produced a response (connection, TLS, decoding).
    Transport(String),
    /// Local fallback store could not be read or written.
    Storage(String),
}

impl TaskError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Builds a `Remote` error from a response status and body.
    ///
    /// The message comes from a JSON `message` field when present, else the
    /// raw body (possibly empty).
    pub fn remote(status_code: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let message = serde_json::from_str::<Value>(trimmed)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| trimmed.to_string());
        Self::Remote {
            status_code,
            message,
        }
    }

    /// True when the failure means the session is missing or no longer accepted.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::Remote {
                status_code: 401,
                ..
            }
        )
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Unauthenticated => write!(f, "Not logged in"),
            TaskError::InvalidInput(message) => write!(f, "{message}"),
            TaskError::NotFound { id } => write!(f, "Task not found: {id}"),
            TaskError::Remote {
                status_code,
                message,
            } if message.is_empty() => write!(f, "HTTP {status_code}"),
            TaskError::Remote {
                status_code,
                message,
            } => write!(f, "HTTP {status_code}: {message}"),
            TaskError::Transport(message) => write!(f, "Request failed: {message}"),
            TaskError::Storage(message) => write!(f, "Storage error: {message}"),
        }
    }
}

impl std::error::Error for TaskError {}
