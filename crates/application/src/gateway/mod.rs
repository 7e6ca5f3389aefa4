//! Authenticated request gateway.
//!
//! Every call goes through the same pipeline:
//! 1. [`interceptors::apply_auth_header`] attaches the session token
//! 2. the transport sends the request
//! 3. [`interceptors::check_status`] classifies the HTTP status
//! 4. a 401 on a non-bypassing call renews the access token once and
//!    re-issues the request (see `refresh.rs`)
//! 5. [`interceptors::unwrap_envelope`] unwraps `{code, message, data}`,
//!    except for the refresh endpoint whose body is returned raw
//!
//! Failures are surfaced through the [`Notifier`] unless the call set
//! `bypass_error`.

pub mod interceptors;
mod options;
mod refresh;

pub use options::RequestOptions;

use std::future::Future;
use std::sync::Arc;

use agrisky_domain::{ApiRequest, HttpMethod, is_login_endpoint, is_refresh_endpoint};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};
use crate::ports::{CancellationToken, HttpTransport, Navigator, Notifier, TransportResponse};
use crate::session::SessionState;

/// Sends API calls with the current credentials and recovers from expired
/// access tokens.
///
/// Shareable across tasks behind an `Arc`.
pub struct Gateway {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionState>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    /// Serializes token refreshes when coalescing is on.
    refresh_lock: Mutex<()>,
    coalesce_refresh: bool,
}

impl Gateway {
    /// Creates a gateway. Concurrent refreshes are coalesced by default.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionState>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            notifier,
            navigator,
            refresh_lock: Mutex::new(()),
            coalesce_refresh: true,
        }
    }

    /// Turns refresh coalescing on or off.
    ///
    /// When off, every request that fails with 401 issues its own refresh
    /// call, even if another request is already refreshing.
    #[must_use]
    pub const fn with_coalesced_refresh(mut self, coalesce: bool) -> Self {
        self.coalesce_refresh = coalesce;
        self
    }

    /// The session this gateway reads and renews.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Sends a GET request and decodes the payload.
    ///
    /// # Errors
    ///
    /// Returns any [`GatewayError`] raised by the pipeline, or `Decode` if
    /// the payload does not match `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> GatewayResult<T> {
        self.call(HttpMethod::Get, path, None, options).await
    }

    /// Sends a POST request with a JSON body and decodes the payload.
    ///
    /// # Errors
    ///
    /// See [`Gateway::get`]; also `Encode` if `body` cannot be serialized.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> GatewayResult<T> {
        let body = encode(body)?;
        self.call(HttpMethod::Post, path, Some(body), options).await
    }

    /// Sends a PUT request with a JSON body and decodes the payload.
    ///
    /// # Errors
    ///
    /// See [`Gateway::post`].
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> GatewayResult<T> {
        let body = encode(body)?;
        self.call(HttpMethod::Put, path, Some(body), options).await
    }

    /// Sends a DELETE request and decodes the payload.
    ///
    /// # Errors
    ///
    /// See [`Gateway::get`].
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> GatewayResult<T> {
        self.call(HttpMethod::Delete, path, None, options).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> GatewayResult<T> {
        let RequestOptions {
            bypass_error,
            headers,
            cancel,
        } = options;
        let request = ApiRequest {
            method,
            path: path.to_string(),
            headers,
            body,
            bypass_error,
        };
        let payload = self.send(request, cancel.as_ref()).await?;
        serde_json::from_value(payload).map_err(|e| {
            let err = GatewayError::Decode(e.to_string());
            if !bypass_error {
                self.notifier.error(&err.notification_message());
            }
            err
        })
    }

    /// Runs one request through the full pipeline and returns the payload.
    ///
    /// For the refresh endpoint the raw JSON body is returned; for every
    /// other endpoint, the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Returns the final [`GatewayError`] of the pipeline.
    pub async fn send(
        &self,
        request: ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> GatewayResult<Value> {
        let bypass_error = request.bypass_error;
        let raw = is_refresh_endpoint(&request.path);
        let response = self.send_raw(request, cancel).await?;

        let result = if raw {
            response
                .body_json()
                .map_err(|e| GatewayError::Decode(format!("invalid JSON body: {e}")))
        } else {
            interceptors::unwrap_envelope(&response)
        };
        result.inspect_err(|err| {
            if !bypass_error {
                self.notifier.error(&err.notification_message());
            }
        })
    }

    /// Runs one request through the pipeline up to, but not including,
    /// envelope unwrapping.
    ///
    /// # Errors
    ///
    /// Returns the final transport, status, or session error.
    pub async fn send_raw(
        &self,
        request: ApiRequest,
        cancel: Option<&CancellationToken>,
    ) -> GatewayResult<TransportResponse> {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(GatewayError::Cancelled);
        }
        cancellable(self.dispatch(request), cancel).await
    }

    async fn dispatch(&self, mut request: ApiRequest) -> GatewayResult<TransportResponse> {
        request.validate()?;
        let access_token = self.session.current_access_token().await;
        let sent_with = interceptors::apply_auth_header(&mut request, access_token.as_deref());
        debug!(method = %request.method, path = %request.path, "sending request");

        match self.execute(&request).await {
            Ok(response) => Ok(response),
            Err(err)
                if err.is_unauthorized()
                    && !request.bypass_error
                    && !is_login_endpoint(&request.path) =>
            {
                self.handle_unauthorized(request, sent_with, err).await
            }
            Err(err) => Err(self.surface(&request, err)),
        }
    }

    /// Sends through the transport and classifies the status. No
    /// notification, no retry.
    async fn execute(&self, request: &ApiRequest) -> GatewayResult<TransportResponse> {
        let response = self.transport.execute(request).await?;
        interceptors::check_status(response)
    }

    /// Notifies the user about `err` unless the call opted out.
    fn surface(&self, request: &ApiRequest, err: GatewayError) -> GatewayError {
        if !request.bypass_error {
            self.notifier.error(&err.notification_message());
        }
        err
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("coalesce_refresh", &self.coalesce_refresh)
            .finish_non_exhaustive()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> GatewayResult<Value> {
    serde_json::to_value(body).map_err(|e| GatewayError::Encode(e.to_string()))
}

/// Runs `future` unless `token` fires first.
async fn cancellable<T, F>(future: F, token: Option<&CancellationToken>) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    match token {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => Err(GatewayError::Cancelled),
            result = future => result,
        },
        None => future.await,
    }
}
