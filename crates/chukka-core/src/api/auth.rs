//! Authentication calls and the session activation they drive.

use serde::Deserialize;
use serde_json::json;

use super::ApiClient;
use crate::error::{Error, Result};
use crate::models::UserDto;
use crate::session::{ActiveSession, UserProfile};
use crate::util::normalize_text_option;

/// Sign-up fields for [`ApiClient::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Body of a successful login/register call.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: UserDto,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user", &self.user)
            .finish()
    }
}

/// Body of a successful token refresh.
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for RefreshResponse {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RefreshResponse")
            .field("token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ApiClient {
    /// Sign in; on success the session context is activated and persisted.
    ///
    /// On failure nothing is stored and the classified error surfaces as-is.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let email = require_text(email, "email")?;
        let password = require_password(password)?;

        let response: AuthResponse = self
            .post_unauthenticated(
                "/api/auth/login",
                &json!({ "email": email, "password": password }),
            )
            .await?;
        self.activate_session(response)
    }

    /// Create an account; on success behaves like [`Self::login`].
    pub async fn register(&self, account: &NewAccount) -> Result<UserProfile> {
        let email = require_text(&account.email, "email")?;
        let password = require_password(&account.password)?;

        let mut body = json!({ "email": email, "password": password });
        if let Some(display_name) = normalize_text_option(account.display_name.clone()) {
            body["display_name"] = json!(display_name);
        }

        let response: AuthResponse = self
            .post_unauthenticated("/api/auth/register", &body)
            .await?;
        self.activate_session(response)
    }

    /// Trade the stored refresh token for fresh tokens, keeping the cached
    /// profile.
    pub async fn refresh_session(&self) -> Result<()> {
        let refresh_token = self.session().refresh_token().ok_or_else(|| {
            Error::InvalidInput("no refresh token stored; sign in first".to_string())
        })?;

        let response: RefreshResponse = self
            .post_unauthenticated(
                "/api/auth/refresh",
                &json!({ "refresh_token": refresh_token }),
            )
            .await?;
        self.session()
            .replace_tokens(response.token, response.refresh_token)
    }

    /// Sign out locally. No network call involved.
    pub fn logout(&self) -> Result<()> {
        self.session().clear()
    }

    fn activate_session(&self, response: AuthResponse) -> Result<UserProfile> {
        let profile = UserProfile::from(response.user);
        self.session().activate(ActiveSession {
            token: response.token,
            refresh_token: response.refresh_token,
            profile: profile.clone(),
        })?;
        Ok(profile)
    }
}

fn require_text(value: &str, label: &str) -> Result<String> {
    normalize_text_option(Some(value.to_string()))
        .ok_or_else(|| Error::InvalidInput(format!("{label} must not be empty")))
}

// passwords are taken verbatim, only emptiness is rejected
fn require_password(value: &str) -> Result<String> {
    if value.is_empty() {
        Err(Error::InvalidInput("password must not be empty".to_string()))
    } else {
        Ok(value.to_string())
    }
}
