//! Deterministic JSON serialization for the session file.
//!
//! Keys come out sorted (via `BTreeMap`), indented with two spaces and
//! terminated by a newline.

mod json;

pub use json::*;
