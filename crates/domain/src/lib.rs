//! AgriSky Domain - Core business types
//!
//! This crate defines the domain model for the AgriSky dashboard client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod request;
pub mod response;
pub mod task;

pub use auth::{
    Credentials, LOGIN_PATH, LOGIN_ROUTE, LOGOUT_PATH, REFRESH_PATH, RefreshedToken, TokenPair,
    is_login_endpoint, is_refresh_endpoint, token_preview,
};
pub use error::{DomainError, DomainResult};
pub use request::{ApiRequest, AUTHORIZATION, Headers, HttpMethod, bearer_value};
pub use response::{ApiEnvelope, SUCCESS_CODE};
pub use task::{TASK_PATH, Task, TaskKind, TaskStatus};
