//! AgriSky Application - Authenticated request gateway and use cases
//!
//! This crate holds the client's control flow: the gateway that attaches
//! credentials and renews them on 401, the session it renews, and the use
//! cases built on top. I/O is reached only through the traits in
//! [`ports`].

pub mod error;
pub mod gateway;
pub mod ports;
pub mod session;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use error::{
    GatewayError, GatewayResult, NETWORK_ERROR_MESSAGE, REQUEST_FAILED_MESSAGE,
    SESSION_EXPIRED_MESSAGE,
};
pub use gateway::{Gateway, RequestOptions};
pub use session::{MemorySessionStorage, SessionState};
pub use use_cases::{ListTasks, Login, Logout, RefreshSession};
