//! Outbound request description.

mod headers;
mod method;

pub use headers::{AUTHORIZATION, Headers, bearer_value};
pub use method::HttpMethod;

use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// One outbound API call, before the gateway has touched it.
///
/// `bypass_error` suppresses user-facing notification and disables the
/// refresh-and-retry path for this call only.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the API base URL, e.g. `/api/task`.
    pub path: String,
    /// Request headers.
    pub headers: Headers,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Opt out of notification and refresh-retry.
    pub bypass_error: bool,
}

impl ApiRequest {
    /// Creates a request with no headers and no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: None,
            bypass_error: false,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).with_body(body)
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Marks the call as bypassing notification and refresh-retry.
    #[must_use]
    pub const fn bypassing_errors(mut self) -> Self {
        self.bypass_error = true;
        self
    }

    /// Returns true if the caller supplied its own `Authorization` header.
    #[must_use]
    pub fn has_authorization(&self) -> bool {
        self.headers.contains(AUTHORIZATION)
    }

    /// Checks that the path is non-empty and rooted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPath` otherwise.
    pub fn validate(&self) -> DomainResult<()> {
        if self.path.is_empty() || !self.path.starts_with('/') {
            return Err(DomainError::InvalidPath(self.path.clone()));
        }
        if let Some((name, _)) = self
            .headers
            .iter()
            .find(|(name, _)| name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ':'))
        {
            return Err(DomainError::InvalidHeaderName(name.to_string()));
        }
        Ok(())
    }
}
