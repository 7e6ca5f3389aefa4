//! Pre-send and post-receive transformations.
//!
//! These are plain functions the gateway calls in order; nothing is
//! registered globally.

use agrisky_domain::{ApiEnvelope, ApiRequest};
use serde_json::Value;

use crate::error::{GatewayError, REQUEST_FAILED_MESSAGE};
use crate::ports::TransportResponse;

/// Attaches `Authorization: Bearer <access_token>` unless the caller set
/// an `Authorization` header already.
///
/// Returns the token that was attached, if any.
pub fn apply_auth_header(request: &mut ApiRequest, access_token: Option<&str>) -> Option<String> {
    if request.has_authorization() {
        return None;
    }
    let token = access_token.filter(|token| !token.is_empty())?;
    request.headers.set_bearer(token);
    Some(token.to_string())
}

/// Turns non-2xx responses into `GatewayError::Status`.
///
/// # Errors
///
/// Returns `GatewayError::Status` for any status outside 200..300.
pub fn check_status(response: TransportResponse) -> Result<TransportResponse, GatewayError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::from_status(&response))
    }
}

/// Unwraps the `{code, message, data}` envelope.
///
/// # Errors
///
/// - `GatewayError::Domain` when `code != 200`; the message falls back to
///   a generic text when absent or empty
/// - `GatewayError::Decode` when the body is not an envelope
pub fn unwrap_envelope(response: &TransportResponse) -> Result<Value, GatewayError> {
    let body = response
        .body_json()
        .map_err(|e| GatewayError::Decode(format!("invalid JSON body: {e}")))?;
    let envelope: ApiEnvelope = serde_json::from_value(body)
        .map_err(|e| GatewayError::Decode(format!("not an API envelope: {e}")))?;

    if envelope.is_success() {
        return Ok(envelope.data);
    }
    Err(GatewayError::Domain {
        code: envelope.code,
        message: envelope.message_or(REQUEST_FAILED_MESSAGE).to_string(),
    })
}
