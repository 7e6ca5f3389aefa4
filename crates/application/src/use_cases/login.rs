//! Login use case.

use std::sync::Arc;

use agrisky_domain::{Credentials, LOGIN_PATH, TokenPair};
use tracing::info;

use crate::error::GatewayResult;
use crate::gateway::{Gateway, RequestOptions};

/// Use case for signing in and starting a session.
pub struct Login {
    gateway: Arc<Gateway>,
}

impl Login {
    /// Creates a new `Login` use case.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Exchanges credentials for a token pair and stores it in the session.
    ///
    /// # Errors
    /// - Returns error if the backend rejects the credentials
    /// - Returns error if the session cannot be persisted
    pub async fn execute(&self, credentials: &Credentials) -> GatewayResult<TokenPair> {
        let pair: TokenPair = self
            .gateway
            .post(LOGIN_PATH, credentials, RequestOptions::new())
            .await?;
        self.gateway.session().on_login(&pair).await?;
        info!(username = %credentials.username, "logged in");
        Ok(pair)
    }
}
