//! Auth gateway: sign-up, verification, login, session restore, logout.
//!
//! Inputs are validated before the identity provider is contacted. Successful
//! login and sign-up write to the session store; the task gateway picks the
//! session up from there.

mod cognito;
mod error;

use chrono::Utc;

pub use cognito::{AuthTokens, CognitoClient, SignUpResult, UserProfile};
pub use error::AuthError;

use crate::config::IdentityConfig;
use crate::session::{PendingIdentity, Session, SessionStore};
use crate::shared::mask_token;

/// Minimum password length accepted by sign-up and login.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Length of an email verification code.
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Result of `AuthGateway::restore_session`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A usable session is in the store.
    Restored(Session),
    /// Nothing was persisted.
    NoSession,
    /// A session existed but could not be renewed; the store was cleared.
    Expired,
}

#[derive(Debug, Clone)]
pub struct AuthGateway {
    provider: CognitoClient,
    sessions: SessionStore,
}

impl AuthGateway {
    pub fn new(provider: CognitoClient, sessions: SessionStore) -> Self {
        Self { provider, sessions }
    }

    /// Builds the gateway from the `[identity]` config section.
    ///
    /// # Errors
    /// Returns an error if the configured endpoint is not a valid URL.
    pub fn from_config(identity: &IdentityConfig, sessions: SessionStore) -> anyhow::Result<Self> {
        let endpoint = identity.effective_endpoint()?;
        Ok(Self::new(
            CognitoClient::new(endpoint, identity.client_id.trim()),
            sessions,
        ))
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Registers a new identity and stores it as pending verification.
    ///
    /// # Errors
    /// Returns `Validation` for empty fields or a short password, `Provider`
    /// if the pool rejects the registration.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PendingIdentity, AuthError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::validation("Please fill in all fields"));
        }
        check_password(password)?;

        let result = self.provider.sign_up(email, password, name).await?;
        let pending = PendingIdentity {
            username: email.to_string(),
            user_sub: result.user_sub,
            confirmed: result.user_confirmed,
            destination: result.code_delivery_details.and_then(|d| d.destination),
        };
        self.sessions.set_pending(pending.clone()).map_err(storage)?;
        tracing::info!(username = %pending.username, "Signed up, awaiting verification");
        Ok(pending)
    }

    /// Confirms the pending identity with an emailed code.
    ///
    /// # Errors
    /// Returns `NoPendingSignUp` without a prior sign-up, `Validation` unless
    /// the code is six digits, `Provider` for a wrong or expired code.
    pub async fn verify(&self, code: &str) -> Result<(), AuthError> {
        let mut pending = self.sessions.pending().ok_or(AuthError::NoPendingSignUp)?;
        let code = code.trim();
        if code.len() != VERIFICATION_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::validation("Please enter a valid 6-digit code"));
        }

        self.provider
            .confirm_sign_up(&pending.username, code)
            .await?;
        pending.confirmed = true;
        self.sessions.set_pending(pending).map_err(storage)?;
        tracing::info!("Email verified");
        Ok(())
    }

    /// Sends a fresh verification code. Returns where it went, if reported.
    ///
    /// # Errors
    /// Returns `NoPendingSignUp` without a prior sign-up, `Provider` if the
    /// pool refuses.
    pub async fn resend_verification(&self) -> Result<Option<String>, AuthError> {
        let pending = self.sessions.pending().ok_or(AuthError::NoPendingSignUp)?;
        self.provider
            .resend_confirmation_code(&pending.username)
            .await
    }

    /// Authenticates and stores the new session.
    ///
    /// # Errors
    /// Returns `Validation` for empty fields or a short password (no provider
    /// call is made), `Provider` for rejected credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::validation("Please enter email and password"));
        }
        check_password(password)?;

        let tokens = self.provider.password_auth(email, password).await?;
        let profile = match self.provider.get_user(&tokens.access_token).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read user attributes");
                UserProfile::default()
            }
        };

        let session = Session {
            expires_at: tokens.expires_at(Utc::now()),
            token: tokens.id_token,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            username: email.to_string(),
            display_name: profile.name,
            email: Some(profile.email.unwrap_or_else(|| email.to_string())),
        };
        self.sessions.set(session.clone()).map_err(storage)?;
        if self
            .sessions
            .pending()
            .is_some_and(|p| p.username.eq_ignore_ascii_case(email))
        {
            self.sessions.clear_pending().map_err(storage)?;
        }

        tracing::info!(username = %session.username, token = %mask_token(&session.token), "Logged in");
        Ok(session)
    }

    /// Reinstates a persisted session, refreshing it if expired.
    ///
    /// Never fails: anything that prevents a usable session clears the store
    /// and yields `Expired`.
    pub async fn restore_session(&self) -> RestoreOutcome {
        let Some(session) = self.sessions.get() else {
            return RestoreOutcome::NoSession;
        };
        if !session.is_expired() {
            return RestoreOutcome::Restored(session);
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            tracing::info!("Session expired without refresh token");
            self.discard_session();
            return RestoreOutcome::Expired;
        };

        match self.provider.refresh(&refresh_token).await {
            Ok(tokens) => {
                let renewed = Session {
                    expires_at: tokens.expires_at(Utc::now()),
                    token: tokens.id_token,
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token.or(Some(refresh_token)),
                    ..session
                };
                if let Err(e) = self.sessions.set(renewed.clone()) {
                    tracing::warn!(error = %e, "Failed to persist refreshed session");
                }
                tracing::info!(username = %renewed.username, "Session refreshed");
                RestoreOutcome::Restored(renewed)
            }
            Err(e) => {
                tracing::info!(error = %e, "Session refresh failed");
                self.discard_session();
                RestoreOutcome::Expired
            }
        }
    }

    /// Ends the session. Provider-side sign-out is best effort; calling this
    /// without a session succeeds.
    ///
    /// # Errors
    /// Returns `Storage` if the session store cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthError> {
        if let Some(session) = self.sessions.get() {
            if let Err(e) = self.provider.global_sign_out(&session.access_token).await {
                tracing::warn!(error = %e, "Provider sign-out failed");
            }
            tracing::info!(username = %session.username, "Logged out");
        }
        self.sessions.clear().map_err(storage)?;
        self.sessions.clear_pending().map_err(storage)?;
        Ok(())
    }

    fn discard_session(&self) {
        if let Err(e) = self.sessions.clear() {
            tracing::warn!(error = %e, "Failed to clear expired session");
        }
    }
}

fn check_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn storage(err: anyhow::Error) -> AuthError {
    AuthError::Storage(format!("{err:#}"))
}
