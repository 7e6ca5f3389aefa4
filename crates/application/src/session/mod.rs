//! Session store for the authenticated request gateway.
//!
//! This module provides:
//! - The shared access/refresh token pair with write-through persistence
//! - An in-memory storage backend

mod memory;
mod state;

pub use memory::MemorySessionStorage;
pub use state::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SessionState};
