//! Per-call options.

use agrisky_domain::Headers;

use crate::ports::CancellationToken;

/// Options accepted by every gateway verb.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Suppress user notification and the 401 refresh-retry for this call.
    pub bypass_error: bool,
    /// Headers to send. A preset `Authorization` header is never replaced
    /// by the session token.
    pub headers: Headers,
    /// Abandons the call (including a pending refresh-retry) when cancelled.
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a call that handles its own errors.
    #[must_use]
    pub fn bypassing_errors() -> Self {
        Self {
            bypass_error: true,
            ..Self::default()
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}
