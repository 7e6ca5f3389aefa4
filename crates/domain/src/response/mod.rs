//! Response types

mod envelope;

pub use envelope::{ApiEnvelope, SUCCESS_CODE};
