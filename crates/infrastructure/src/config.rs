//! Client configuration loading.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `AGRISKY_*` environment variables (`AGRISKY_API_BASE_URL`,
//!    `AGRISKY_TIMEOUT_MS`, `AGRISKY_STORAGE_DIR`, ...)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default backend address.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default per-request deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "AGRISKY";

const SESSION_FILE_NAME: &str = "session.json";

/// Errors raised while loading or interpreting the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// `api_base_url` is not an absolute URL.
    #[error("invalid api_base_url '{url}': {reason}")]
    InvalidBaseUrl {
        /// The configured value.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// No storage directory was configured and the platform has no data dir.
    #[error("no storage directory configured and no platform data directory found")]
    NoDataDir,
}

/// Runtime configuration of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL; request paths are appended to it.
    pub api_base_url: String,
    /// Uniform deadline for every call, refresh included.
    pub timeout_ms: u64,
    /// Directory holding the session file.
    pub storage_dir: Option<PathBuf>,
    /// Whether concurrent 401s share a single refresh call.
    pub coalesce_refresh: bool,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            storage_dir: None,
            coalesce_refresh: true,
            user_agent: format!("AgriSky/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Loads the configuration from defaults, `file` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, or a value has
    /// the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timeout_ms = i64::try_from(defaults.timeout_ms).unwrap_or(i64::MAX);

        let mut builder = ::config::Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("timeout_ms", timeout_ms)?
            .set_default("coalesce_refresh", defaults.coalesce_refresh)?
            .set_default("user_agent", defaults.user_agent)?;

        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parses `api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an absolute URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })
    }

    /// Returns the request deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the directory holding the session file.
    ///
    /// # Errors
    ///
    /// Returns an error if none is configured and the platform has no data
    /// directory.
    pub fn storage_dir(&self) -> Result<PathBuf, ConfigError> {
        self.storage_dir.clone().map_or_else(
            || {
                dirs::data_dir()
                    .map(|dir| dir.join("agrisky"))
                    .ok_or(ConfigError::NoDataDir)
            },
            Ok,
        )
    }

    /// Returns the session file path.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::storage_dir`].
    pub fn session_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.storage_dir()?.join(SESSION_FILE_NAME))
    }
}
