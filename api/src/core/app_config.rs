use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use completion_service::{
    CompletionConfig, ConfigError,
    config::default_config::config_openrouter,
    error_handler::{env_opt, env_opt_port, env_opt_u64},
};

/// Listen port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5000;

/// History file used when `HISTORY_FILE` is unset.
pub const DEFAULT_HISTORY_FILE: &str = "search_history.txt";

/// Throttle interval used when `ASK_MIN_INTERVAL_MS` is unset.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Immutable process configuration, loaded once at start-up and handed to
/// [`crate::AppState`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to listen on (all interfaces).
    pub port: u16,
    /// Append-only history file.
    pub history_file: PathBuf,
    /// Minimum spacing between admitted `/ask` calls, process-wide.
    pub min_interval: Duration,
    /// Upstream completion settings.
    pub completion: CompletionConfig,
}

impl AppConfig {
    /// Loads the configuration from environment variables.
    ///
    /// Env:
    /// - `PORT` (default `5000`)
    /// - `HISTORY_FILE` (default `search_history.txt`)
    /// - `ASK_MIN_INTERVAL_MS` (default `1000`)
    /// - everything read by [`config_openrouter`]
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: env_opt_port("PORT")?.unwrap_or(DEFAULT_PORT),
            history_file: env_opt("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE)),
            min_interval: env_opt_u64("ASK_MIN_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_MIN_INTERVAL),
            completion: config_openrouter()?,
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            min_interval: DEFAULT_MIN_INTERVAL,
            completion: CompletionConfig::default(),
        }
    }
}
