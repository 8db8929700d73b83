//! Auth gateway errors.

use std::fmt;

use serde_json::Value;

/// Failure of an auth gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Input rejected before contacting the identity provider.
    Validation(String),
    /// Identity provider rejected the request.
    Provider { code: String, message: String },
    /// Verification attempted before sign-up.
    NoPendingSignUp,
    /// Request never produced a usable response.
    Transport(String),
    /// Session store could not be written.
    Storage(String),
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds a `Provider` error from a response status and body.
    ///
    /// Provider bodies look like `{"__type": "...#UsernameExistsException",
    /// "message": "..."}`; the code is the part after any `#`.
    pub fn from_response(status_code: u16, body: &str) -> Self {
        let json = serde_json::from_str::<Value>(body.trim()).ok();
        let field = |name: &str| {
            json.as_ref()
                .and_then(|j| j.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let code = field("__type")
            .or_else(|| field("code"))
            .map(|t| t.rsplit('#').next().unwrap_or_default().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format!("HTTP {status_code}"));
        let message = field("message")
            .or_else(|| field("Message"))
            .unwrap_or_else(|| body.trim().to_string());

        Self::Provider { code, message }
    }

    /// Provider error code, if this is a provider rejection.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Provider { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(message) => write!(f, "{message}"),
            AuthError::Provider { code, message } if message.is_empty() => write!(f, "{code}"),
            AuthError::Provider { message, .. } => write!(f, "{message}"),
            AuthError::NoPendingSignUp => write!(f, "Please sign up first"),
            AuthError::Transport(message) => write!(f, "Request failed: {message}"),
            AuthError::Storage(message) => write!(f, "Failed to save session: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_parses_provider_body() {
        let err = AuthError::from_response(
            400,
            r#"{"__type":"UsernameExistsException","message":"An account with the given email already exists."}"#,
        );
        assert_eq!(err.code(), Some("UsernameExistsException"));
        assert_eq!(
            err.to_string(),
            "An account with the given email already exists."
        );
    }

    #[test]
    fn test_from_response_strips_namespace() {
        let err = AuthError::from_response(
            400,
            r#"{"__type":"com.amazonaws.cognito#NotAuthorizedException","message":"Incorrect username or password."}"#,
        );
        assert_eq!(err.code(), Some("NotAuthorizedException"));
    }

    #[test]
    fn test_from_response_without_json() {
        let err = AuthError::from_response(502, "");
        assert_eq!(err.code(), Some("HTTP 502"));
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn test_no_pending_message() {
        assert_eq!(AuthError::NoPendingSignUp.to_string(), "Please sign up first");
    }
}
