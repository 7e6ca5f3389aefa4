//! Explicit session renewal use case.

use std::sync::Arc;

use agrisky_domain::RefreshedToken;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;

/// Use case for renewing the access token ahead of expiry.
///
/// The gateway already renews on 401; this lets a caller do it on demand.
pub struct RefreshSession {
    gateway: Arc<Gateway>,
}

impl RefreshSession {
    /// Creates a new `RefreshSession` use case.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Calls the refresh endpoint with the stored refresh token and stores
    /// the result.
    ///
    /// # Errors
    /// - `NotAuthenticated` if no refresh token is stored
    /// - the refresh call's error otherwise; the session is left untouched
    pub async fn execute(&self) -> GatewayResult<RefreshedToken> {
        let session = self.gateway.session();
        let refresh_token = session
            .current_refresh_token()
            .await
            .ok_or(GatewayError::NotAuthenticated)?;
        let refreshed = self.gateway.request_token_refresh(&refresh_token).await?;
        session.on_refreshed(&refreshed).await?;
        Ok(refreshed)
    }
}
