//! Authentication domain types

mod types;

pub use types::{
    Credentials, LOGIN_PATH, LOGIN_ROUTE, LOGOUT_PATH, REFRESH_PATH, RefreshedToken, TokenPair,
    is_login_endpoint, is_refresh_endpoint, token_preview,
};
