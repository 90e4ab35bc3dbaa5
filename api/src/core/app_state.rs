use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use completion_service::{CompletionBackend, CompletionError, OpenRouterService};
use history_log::HistoryLog;
use serde::Serialize;
use tracing::{info, warn};

use crate::core::{app_config::AppConfig, throttle::Throttle};

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Configuration loaded at start-up.
    pub config: AppConfig,
    /// Completion backend; `None` when no credential is configured.
    pub completion: Option<Arc<dyn CompletionBackend>>,
    /// Global admission gate for `/ask`.
    pub throttle: Throttle,
    /// Best-effort exchange log.
    pub history: HistoryLog,
    /// Process-wide request counters.
    pub stats: RequestStats,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Builds the state with the OpenRouter client when a credential is set.
    ///
    /// A missing credential is not an error here: the server still starts and
    /// `/ask` answers with a configuration error.
    pub fn new(config: AppConfig) -> Result<Self, CompletionError> {
        let completion: Option<Arc<dyn CompletionBackend>> = if config.completion.has_api_key() {
            Some(Arc::new(OpenRouterService::new(config.completion.clone())?))
        } else {
            warn!("no API key configured; /ask requests will fail until OPENROUTER_API_KEY is set");
            None
        };
        Ok(Self::with_backend(config, completion))
    }

    /// Builds the state around an explicit backend.
    pub fn with_backend(config: AppConfig, completion: Option<Arc<dyn CompletionBackend>>) -> Self {
        info!(
            history_file = %config.history_file.display(),
            min_interval_ms = config.min_interval.as_millis(),
            backend_ready = completion.is_some(),
            "application state ready"
        );
        Self {
            throttle: Throttle::new(config.min_interval),
            history: HistoryLog::new(config.history_file.clone()),
            stats: RequestStats::default(),
            started_at: Instant::now(),
            completion,
            config,
        }
    }
}

/// Monotonic counters for `/ask`.
///
/// Every counted request ends up in exactly one of `answered` or `failed`,
/// including requests whose handler panicked.
#[derive(Debug, Default)]
pub struct RequestStats {
    requests: AtomicU64,
    answered: AtomicU64,
    failed: AtomicU64,
}

impl RequestStats {
    /// Counts a new request and returns its in-flight marker.
    pub fn begin(&self) -> InFlight<'_> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        InFlight {
            stats: self,
            answered: false,
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_total: self.requests.load(Ordering::Relaxed),
            answered_total: self.answered.load(Ordering::Relaxed),
            failed_total: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// One `/ask` call in progress.
///
/// Dropped without [`InFlight::answered`] (error return, panic unwinding or a
/// cancelled future) it counts as failed.
#[must_use]
#[derive(Debug)]
pub struct InFlight<'a> {
    stats: &'a RequestStats,
    answered: bool,
}

impl InFlight<'_> {
    pub fn answered(mut self) {
        self.answered = true;
        self.stats.answered.fetch_add(1, Ordering::Relaxed);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.answered {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub requests_total: u64,
    pub answered_total: u64,
    pub failed_total: u64,
}
