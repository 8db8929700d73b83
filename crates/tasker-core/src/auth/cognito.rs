//! Cognito user pool client (JSON 1.1 protocol).
//!
//! Every operation is a `POST {endpoint}/` with the operation named in the
//! `X-Amz-Target` header. Only unauthenticated (public client) and
//! access-token operations are used, so no request signing is needed.

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::AuthError;
use crate::shared::{self, real_api_blocked};

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// Tokens returned by a successful `InitiateAuth`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: String,
    /// Absent on refresh; the existing refresh token stays valid.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the ID/access tokens in seconds.
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

impl AuthTokens {
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(self.expires_in)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthTokens>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CodeDelivery {
    #[serde(default)]
    pub destination: Option<String>,
}

/// Result of `SignUp`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpResult {
    #[serde(default)]
    pub user_confirmed: bool,
    #[serde(default)]
    pub user_sub: Option<String>,
    #[serde(default)]
    pub code_delivery_details: Option<CodeDelivery>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResendResponse {
    #[serde(default)]
    code_delivery_details: Option<CodeDelivery>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Attribute {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserResponse {
    #[serde(default)]
    user_attributes: Vec<Attribute>,
}

/// Profile attributes from `GetUser`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// HTTP client for one user pool app client.
#[derive(Debug, Clone)]
pub struct CognitoClient {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
}

impl CognitoClient {
    pub fn new(endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            client_id: client_id.into(),
        }
    }

    /// # Errors
    /// Returns `Provider` if the pool rejects the registration.
    pub async fn sign_up(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpResult, AuthError> {
        let body = json!({
            "ClientId": self.client_id,
            "Username": username,
            "Password": password,
            "UserAttributes": [
                { "Name": "email", "Value": username },
                { "Name": "name", "Value": name },
            ],
        });
        self.call("SignUp", &body).await
    }

    /// # Errors
    /// Returns `Provider` for a wrong or expired code.
    pub async fn confirm_sign_up(&self, username: &str, code: &str) -> Result<(), AuthError> {
        let body = json!({
            "ClientId": self.client_id,
            "Username": username,
            "ConfirmationCode": code,
        });
        self.call::<Value>("ConfirmSignUp", &body).await?;
        Ok(())
    }

    /// Returns where the new code was sent, if reported.
    ///
    /// # Errors
    /// Returns `Provider` if the pool refuses to resend.
    pub async fn resend_confirmation_code(
        &self,
        username: &str,
    ) -> Result<Option<String>, AuthError> {
        let body = json!({
            "ClientId": self.client_id,
            "Username": username,
        });
        let response: ResendResponse = self.call("ResendConfirmationCode", &body).await?;
        Ok(response.code_delivery_details.and_then(|d| d.destination))
    }

    /// `InitiateAuth` with `USER_PASSWORD_AUTH`.
    ///
    /// # Errors
    /// Returns `Provider` for bad credentials, an unconfirmed user, or a
    /// challenge this client cannot answer.
    pub async fn password_auth(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthTokens, AuthError> {
        let body = json!({
            "ClientId": self.client_id,
            "AuthFlow": "USER_PASSWORD_AUTH",
            "AuthParameters": { "USERNAME": username, "PASSWORD": password },
        });
        self.initiate_auth(&body).await
    }

    /// `InitiateAuth` with `REFRESH_TOKEN_AUTH`.
    ///
    /// # Errors
    /// Returns `Provider` if the refresh token is expired or revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let body = json!({
            "ClientId": self.client_id,
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "AuthParameters": { "REFRESH_TOKEN": refresh_token },
        });
        self.initiate_auth(&body).await
    }

    /// # Errors
    /// Returns `Provider` if the access token is rejected.
    pub async fn get_user(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let body = json!({ "AccessToken": access_token });
        let response: GetUserResponse = self.call("GetUser", &body).await?;

        let mut profile = UserProfile::default();
        for attr in response.user_attributes {
            match attr.name.as_str() {
                "name" => profile.name = Some(attr.value),
                "email" => profile.email = Some(attr.value),
                _ => {}
            }
        }
        Ok(profile)
    }

    /// Revokes every token issued to the user.
    ///
    /// # Errors
    /// Returns `Provider` if the access token is already invalid.
    pub async fn global_sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let body = json!({ "AccessToken": access_token });
        self.call::<Value>("GlobalSignOut", &body).await?;
        Ok(())
    }

    async fn initiate_auth(&self, body: &Value) -> Result<AuthTokens, AuthError> {
        let response: InitiateAuthResponse = self.call("InitiateAuth", body).await?;
        match (response.authentication_result, response.challenge_name) {
            (Some(tokens), _) => Ok(tokens),
            (None, Some(challenge)) => Err(AuthError::Provider {
                code: "ChallengeRequired".to_string(),
                message: format!("Unsupported sign-in challenge: {challenge}"),
            }),
            (None, None) => Err(AuthError::Transport(
                "Sign-in response had no tokens".to_string(),
            )),
        }
    }

    async fn call<T: DeserializeOwned>(&self, operation: &str, body: &Value) -> Result<T, AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Transport(
                "Identity provider not configured. Set [identity] client_id in config.toml."
                    .to_string(),
            ));
        }
        if real_api_blocked(&self.endpoint) {
            return Err(AuthError::Transport(format!(
                "{}=1 but trying to use the production identity provider: {}",
                shared::BLOCK_REAL_API_ENV,
                self.endpoint
            )));
        }

        tracing::debug!(operation, "Identity provider request");
        let response = self
            .http
            .post(format!("{}/", self.endpoint.trim_end_matches('/')))
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(USER_AGENT, shared::USER_AGENT)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = AuthError::from_response(status.as_u16(), &text);
            tracing::info!(operation, code = err.code().unwrap_or_default(), "Identity provider rejected request");
            return Err(err);
        }

        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| {
            AuthError::Transport(format!("Invalid {operation} response: {e}"))
        })
    }
}
