//! Gateway error types

use agrisky_domain::DomainError;
use thiserror::Error;

use crate::ports::{StorageError, TransportError, TransportResponse};

/// Fallback notification for envelope failures without a message.
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";
/// Fallback notification for transport failures without a message.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";
/// Notification shown when the session could not be renewed.
pub const SESSION_EXPIRED_MESSAGE: &str = "Please log in again";

/// Errors returned by gateway calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request was rejected before sending.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    /// No response could be obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered with a non-2xx status.
    #[error("request failed with status code {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the body, or the status reason.
        message: String,
    },

    /// The envelope carried a code other than 200.
    #[error("{message} (code {code})")]
    Domain {
        /// Envelope code.
        code: i64,
        /// Envelope message, or the generic fallback.
        message: String,
    },

    /// The access token expired and could not be renewed.
    #[error("session expired: {0}")]
    SessionInvalid(#[source] Box<GatewayError>),

    /// No refresh token is stored, so the session cannot be renewed.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Durable session storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The call was cancelled by its caller.
    #[error("request cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Builds a `Status` error from a non-2xx response.
    ///
    /// The message is taken from a JSON `message` field when the body has
    /// one.
    #[must_use]
    pub fn from_status(response: &TransportResponse) -> Self {
        let message = response
            .body_json()
            .ok()
            .and_then(|body| {
                body.get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.trim().is_empty())
                    .map(String::from)
            })
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        Self::Status {
            status: response.status,
            message,
        }
    }

    /// Returns true for an HTTP 401 response.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// Returns true if the session had to be ended.
    #[must_use]
    pub const fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid(_))
    }

    /// Text shown to the user for this error.
    #[must_use]
    pub fn notification_message(&self) -> String {
        match self {
            Self::Domain { message, .. } => message.clone(),
            Self::Decode(_) => REQUEST_FAILED_MESSAGE.to_string(),
            Self::SessionInvalid(_) | Self::NotAuthenticated => SESSION_EXPIRED_MESSAGE.to_string(),
            other => {
                let text = other.to_string();
                if text.trim().is_empty() {
                    NETWORK_ERROR_MESSAGE.to_string()
                } else {
                    text
                }
            }
        }
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_message_from_body() {
        let response = TransportResponse::json(401, &json!({"message": "Token has expired"}));
        let err = GatewayError::from_status(&response);
        assert!(err.is_unauthorized());
        assert_eq!(
            err.to_string(),
            "request failed with status code 401: Token has expired"
        );
    }

    #[test]
    fn test_status_message_fallback() {
        let err = GatewayError::from_status(&TransportResponse::new(502, b"bad gateway".to_vec()));
        assert!(!err.is_unauthorized());
        assert_eq!(err.to_string(), "request failed with status code 502: HTTP 502");
    }

    #[test]
    fn test_notification_messages() {
        let domain = GatewayError::Domain {
            code: 4002,
            message: "invalid parameter".to_string(),
        };
        assert_eq!(domain.notification_message(), "invalid parameter");

        let timeout = GatewayError::Transport(TransportError::Timeout { timeout_ms: 20_000 });
        assert_eq!(timeout.notification_message(), "timeout of 20000ms exceeded");

        let empty = GatewayError::Transport(TransportError::Other(String::new()));
        assert_eq!(empty.notification_message(), NETWORK_ERROR_MESSAGE);

        let decode = GatewayError::Decode("missing code".to_string());
        assert_eq!(decode.notification_message(), REQUEST_FAILED_MESSAGE);
    }
}
