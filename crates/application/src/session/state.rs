//! Current access/refresh token pair, mirrored to durable storage.

use std::sync::Arc;

use agrisky_domain::{RefreshedToken, TokenPair, token_preview};
use tokio::sync::RwLock;
use tracing::debug;

use crate::ports::{SessionStorage, StorageError};

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Debug, Default)]
struct Tokens {
    access: String,
    refresh: String,
}

/// Session shared by every in-flight request.
///
/// The in-memory copy is authoritative for requests; every change is
/// written through to the durable store. Empty strings mean "absent".
pub struct SessionState {
    tokens: RwLock<Tokens>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionState {
    /// Creates an empty session backed by `storage`, without reading it.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            tokens: RwLock::new(Tokens::default()),
            storage,
        }
    }

    /// Restores the session persisted in `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn load(storage: Arc<dyn SessionStorage>) -> Result<Self, StorageError> {
        let access = storage.get(ACCESS_TOKEN_KEY).await?.unwrap_or_default();
        let refresh = storage.get(REFRESH_TOKEN_KEY).await?.unwrap_or_default();
        debug!(
            has_access = !access.is_empty(),
            has_refresh = !refresh.is_empty(),
            "session restored"
        );
        Ok(Self {
            tokens: RwLock::new(Tokens { access, refresh }),
            storage,
        })
    }

    /// Returns the access token, if one is held.
    pub async fn current_access_token(&self) -> Option<String> {
        let tokens = self.tokens.read().await;
        non_empty(&tokens.access)
    }

    /// Returns the refresh token, if one is held.
    pub async fn current_refresh_token(&self) -> Option<String> {
        let tokens = self.tokens.read().await;
        non_empty(&tokens.refresh)
    }

    /// Returns true while an access token is held.
    pub async fn is_authenticated(&self) -> bool {
        !self.tokens.read().await.access.is_empty()
    }

    /// Stores the pair issued on login.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store cannot be written. The
    /// in-memory session is updated regardless.
    pub async fn on_login(&self, pair: &TokenPair) -> Result<(), StorageError> {
        {
            let mut tokens = self.tokens.write().await;
            tokens.access.clone_from(&pair.access_token);
            tokens.refresh.clone_from(&pair.refresh_token);
        }
        self.storage
            .set_many(&[
                (ACCESS_TOKEN_KEY, pair.access_token.as_str()),
                (REFRESH_TOKEN_KEY, pair.refresh_token.as_str()),
            ])
            .await
    }

    /// Stores a renewed access token, and the refresh token if it rotated.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable store cannot be written. The
    /// in-memory session is updated regardless.
    pub async fn on_refreshed(&self, token: &RefreshedToken) -> Result<(), StorageError> {
        let rotated = token
            .refresh_token
            .as_deref()
            .filter(|refresh| !refresh.is_empty());
        {
            let mut tokens = self.tokens.write().await;
            tokens.access.clone_from(&token.access_token);
            if let Some(refresh) = rotated {
                refresh.clone_into(&mut tokens.refresh);
            }
        }
        debug!(
            access = %token_preview(&token.access_token),
            rotated = rotated.is_some(),
            "session renewed"
        );
        match rotated {
            Some(refresh) => {
                self.storage
                    .set_many(&[
                        (ACCESS_TOKEN_KEY, token.access_token.as_str()),
                        (REFRESH_TOKEN_KEY, refresh),
                    ])
                    .await
            }
            None => self.storage.set(ACCESS_TOKEN_KEY, &token.access_token).await,
        }
    }

    /// Forgets both tokens and removes them from durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable entries cannot be removed. The
    /// in-memory session is cleared regardless.
    pub async fn clear(&self) -> Result<(), StorageError> {
        {
            let mut tokens = self.tokens.write().await;
            tokens.access.clear();
            tokens.refresh.clear();
        }
        debug!("session cleared");
        self.storage
            .remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY])
            .await
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState").finish_non_exhaustive()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
