//! Logout use case.

use std::sync::Arc;

use agrisky_domain::LOGOUT_PATH;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::GatewayResult;
use crate::gateway::{Gateway, RequestOptions};

/// Use case for ending the session.
pub struct Logout {
    gateway: Arc<Gateway>,
}

impl Logout {
    /// Creates a new `Logout` use case.
    #[must_use]
    pub const fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Revokes the access token on the backend, then clears the session.
    ///
    /// The local session is cleared even when the backend call fails, so a
    /// dead backend cannot keep a user signed in.
    ///
    /// # Errors
    /// - Returns the backend error after clearing the session
    /// - Returns error if the persisted session cannot be removed
    pub async fn execute(&self) -> GatewayResult<()> {
        let remote = self
            .gateway
            .post::<Value, _>(LOGOUT_PATH, &json!({}), RequestOptions::new())
            .await;
        if let Err(err) = &remote {
            warn!(error = %err, "logout call failed, clearing local session anyway");
        }

        self.gateway.session().clear().await?;
        info!("logged out");
        remote.map(|_| ())
    }
}
