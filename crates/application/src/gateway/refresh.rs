//! Recovery from an expired access token.

use agrisky_domain::{
    ApiRequest, AUTHORIZATION, LOGIN_ROUTE, REFRESH_PATH, RefreshedToken, bearer_value,
    token_preview,
};
use serde_json::json;
use tracing::{debug, info, warn};

use super::Gateway;
use crate::error::{GatewayError, GatewayResult, SESSION_EXPIRED_MESSAGE};
use crate::ports::TransportResponse;

impl Gateway {
    /// Handles a 401 on a non-bypassing call.
    ///
    /// Renews the access token once and re-issues `request` once with it.
    /// The retried request's outcome is final: a second 401 is returned as
    /// a plain failure. If renewal fails, the session is ended and the
    /// renewal error is returned inside `SessionInvalid`.
    pub(super) async fn handle_unauthorized(
        &self,
        mut request: ApiRequest,
        sent_with: Option<String>,
        original: GatewayError,
    ) -> GatewayResult<TransportResponse> {
        debug!(path = %request.path, error = %original, "access token rejected");

        let access_token = match self.renew_access_token(sent_with.as_deref()).await {
            Ok(token) => token,
            Err(err) => return Err(self.end_session(err).await),
        };

        request.headers.set_bearer(&access_token);
        debug!(path = %request.path, "retrying with renewed access token");
        self.execute(&request)
            .await
            .map_err(|err| self.surface(&request, err))
    }

    /// Returns a fresh access token, refreshing at most once.
    ///
    /// With coalescing on, callers queue on `refresh_lock`. A caller whose
    /// rejected token has already been replaced by someone else reuses the
    /// stored token instead of refreshing again.
    async fn renew_access_token(&self, sent_with: Option<&str>) -> GatewayResult<String> {
        let _guard = if self.coalesce_refresh {
            Some(self.refresh_lock.lock().await)
        } else {
            None
        };

        if self.coalesce_refresh
            && let (Some(sent), Some(current)) =
                (sent_with, self.session.current_access_token().await)
            && sent != current
        {
            debug!("access token already renewed by a concurrent request");
            return Ok(current);
        }

        let refresh_token = self
            .session
            .current_refresh_token()
            .await
            .ok_or(GatewayError::NotAuthenticated)?;
        let refreshed = self.request_token_refresh(&refresh_token).await?;
        if let Err(err) = self.session.on_refreshed(&refreshed).await {
            warn!(error = %err, "failed to persist refreshed session");
        }
        info!(
            access = %token_preview(&refreshed.access_token),
            "access token refreshed"
        );
        Ok(refreshed.access_token)
    }

    /// Calls the refresh endpoint with `refresh_token` as the bearer
    /// credential.
    ///
    /// The call bypasses notification and the refresh-retry path, and its
    /// body is read raw, not as an envelope.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error of the call, or `Decode` if
    /// the body carries no access token.
    pub async fn request_token_refresh(&self, refresh_token: &str) -> GatewayResult<RefreshedToken> {
        let request = ApiRequest::post(REFRESH_PATH, json!({}))
            .with_header(AUTHORIZATION, bearer_value(refresh_token))
            .bypassing_errors();
        request.validate()?;

        let response = self.execute(&request).await?;
        let body = response
            .body_json()
            .map_err(|e| GatewayError::Decode(format!("invalid refresh response: {e}")))?;
        RefreshedToken::from_body(&body)
            .ok_or_else(|| GatewayError::Decode("refresh response has no access token".to_string()))
    }

    /// Clears the session, sends the user to the login entry point, and
    /// wraps the renewal failure.
    async fn end_session(&self, cause: GatewayError) -> GatewayError {
        warn!(error = %cause, "token refresh failed, ending session");
        if let Err(err) = self.session.clear().await {
            warn!(error = %err, "failed to remove persisted session");
        }
        self.navigator.navigate(LOGIN_ROUTE);
        self.notifier.error(SESSION_EXPIRED_MESSAGE);
        GatewayError::SessionInvalid(Box::new(cause))
    }
}
