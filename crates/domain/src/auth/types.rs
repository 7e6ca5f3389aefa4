//! Authentication types and endpoint paths

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Login endpoint.
pub const LOGIN_PATH: &str = "/api/auth/login";
/// Logout endpoint.
pub const LOGOUT_PATH: &str = "/api/auth/logout";
/// Token refresh endpoint. Its response is not envelope-wrapped.
pub const REFRESH_PATH: &str = "/api/auth/refresh";
/// Client-side entry point users are sent to when the session is gone.
pub const LOGIN_ROUTE: &str = "/login";

/// Returns true if `url` targets the refresh endpoint.
#[must_use]
pub fn is_refresh_endpoint(url: &str) -> bool {
    targets(url, REFRESH_PATH)
}

/// Returns true if `url` targets the login endpoint.
///
/// A 401 from login means rejected credentials, not an expired token.
#[must_use]
pub fn is_login_endpoint(url: &str) -> bool {
    targets(url, LOGIN_PATH)
}

fn targets(url: &str, endpoint: &str) -> bool {
    url.split(['?', '#'])
        .next()
        .is_some_and(|path| path.ends_with(endpoint))
}

/// Login credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Plain-text password, sent once over TLS.
    pub password: String,
}

impl Credentials {
    /// Creates credentials, rejecting an empty username.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingCredential` if `username` is blank.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> DomainResult<Self> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(DomainError::MissingCredential("username"));
        }
        Ok(Self {
            username,
            password: password.into(),
        })
    }
}

/// Access/refresh token pair issued on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived credential for normal calls.
    pub access_token: String,
    /// Long-lived credential for the refresh call only.
    pub refresh_token: String,
}

/// Payload of the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedToken {
    /// The new access token.
    pub access_token: String,
    /// A rotated refresh token, when the backend issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl RefreshedToken {
    /// Parses a refresh response body.
    ///
    /// The endpoint documents a flat `{access_token}` object, but some
    /// deployments wrap it as `{code, message, data: {access_token}}`.
    /// Both shapes are accepted. Returns `None` when no non-empty access
    /// token can be found.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        let candidate = if body.get("access_token").is_some() {
            body
        } else {
            body.get("data")?
        };
        let token: Self = serde_json::from_value(candidate.clone()).ok()?;
        if token.access_token.is_empty() {
            return None;
        }
        Some(token)
    }
}

/// Shortens a token for log output.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.len() > 12 {
        let cut = token
            .char_indices()
            .nth(8)
            .map_or(token.len(), |(i, _)| i);
        format!("{}...", &token[..cut])
    } else {
        token.to_string()
    }
}
