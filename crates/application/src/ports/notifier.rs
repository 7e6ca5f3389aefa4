//! User-facing notification port

/// Surfaces error messages to the user.
///
/// The gateway calls this at most once per failed call, and never for
/// calls that opted out with `bypass_error`.
pub trait Notifier: Send + Sync {
    /// Shows an error message.
    fn error(&self, message: &str);
}

/// Client-side navigation port.
pub trait Navigator: Send + Sync {
    /// Sends the user to `route`, e.g. the login entry point.
    fn navigate(&self, route: &str);
}
