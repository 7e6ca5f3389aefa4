//! The `{code, message, data}` wrapper most endpoints return.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope code that marks the payload as valid.
pub const SUCCESS_CODE: i64 = 200;

/// Standard response envelope.
///
/// Any `code` other than [`SUCCESS_CODE`] is a domain failure, even when
/// the transport itself returned 2xx.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    /// Backend status code.
    pub code: i64,
    /// Human-readable message, may be absent.
    #[serde(default)]
    pub message: Option<String>,
    /// Payload. `null` when the backend sends none.
    #[serde(default)]
    pub data: Value,
}

impl ApiEnvelope {
    /// Returns true if `code == 200`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Returns the message, or `fallback` when it is absent or empty.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => fallback,
        }
    }
}
