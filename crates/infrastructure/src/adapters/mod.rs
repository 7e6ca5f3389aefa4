//! Adapters implementing application ports.

mod console;
mod reqwest_transport;

pub use console::{LoginNavigator, TracingNotifier};
pub use reqwest_transport::ReqwestTransport;
