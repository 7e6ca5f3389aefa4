//! Terminal adapters for the notification and navigation ports.

use std::sync::{Mutex, PoisonError};

use agrisky_application::ports::{Navigator, Notifier};
use tracing::{info, warn};

/// Notifier that logs at warn and prints the message to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier {
    quiet: bool,
}

impl TracingNotifier {
    /// Creates a notifier that also prints to stderr.
    #[must_use]
    pub const fn new() -> Self {
        Self { quiet: false }
    }

    /// Creates a notifier that only emits tracing events.
    #[must_use]
    pub const fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        warn!(message, "notification");
        if !self.quiet {
            eprintln!("error: {message}");
        }
    }
}

/// Navigator for a terminal client.
///
/// There is no page to switch to, so it records the requested route and
/// tells the user how to sign in again.
#[derive(Debug, Default)]
pub struct LoginNavigator {
    last_route: Mutex<Option<String>>,
}

impl LoginNavigator {
    /// Creates a navigator with no recorded route.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last route navigated to.
    #[must_use]
    pub fn last_route(&self) -> Option<String> {
        self.last_route
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for LoginNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "navigating");
        *self
            .last_route
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(route.to_string());
        eprintln!("hint: run `agrisky login <username>` to start a new session");
    }
}
