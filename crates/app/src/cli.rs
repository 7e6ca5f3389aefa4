//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// AgriSky dashboard client.
#[derive(Debug, Parser)]
#[command(name = "agrisky", version, about)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, env = "AGRISKY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not surface errors and do not refresh the session on 401.
    #[arg(long, global = true)]
    pub bypass_error: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session.
    Login {
        /// Account name.
        username: String,
        /// Password; read from stdin when omitted.
        #[arg(long, env = "AGRISKY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session.
    Logout,
    /// Exchange the refresh token for a new access token.
    Refresh,
    /// Show the stored session and configuration.
    Status,
    /// List tasks.
    Tasks,
    /// Send an authenticated GET and print the payload.
    Get {
        /// Request path, e.g. `/api/task`.
        path: String,
    },
    /// Send an authenticated POST and print the payload.
    Post {
        /// Request path.
        path: String,
        /// JSON body.
        #[arg(long, default_value = "{}")]
        body: String,
    },
    /// Send an authenticated PUT and print the payload.
    Put {
        /// Request path.
        path: String,
        /// JSON body.
        #[arg(long, default_value = "{}")]
        body: String,
    },
    /// Send an authenticated DELETE and print the payload.
    Delete {
        /// Request path.
        path: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["agrisky", "get", "/api/task", "--bypass-error"]).unwrap();
        assert!(cli.bypass_error);
        assert!(matches!(cli.command, Command::Get { ref path } if path == "/api/task"));
    }

    #[test]
    fn test_post_body_defaults_to_empty_object() {
        let parsed = Cli::try_parse_from(["agrisky", "post", "/api/auth/logout"]);
        match parsed.map(|c| c.command) {
            Ok(Command::Post { body, .. }) => assert_eq!(body, "{}"),
            other => panic!("unexpected parse result: {other:?}"),
        }
    }
}
