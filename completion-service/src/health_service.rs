//! Configuration health of the completion client.
//!
//! The snapshot is built from config only and never touches the network, so
//! it is safe to serve from an unauthenticated `/health` endpoint. It never
//! contains the credential value.

use serde::Serialize;

use crate::config::completion_config::CompletionConfig;

/// JSON-serializable view of the completion configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigHealth {
    /// Whether a credential is configured.
    pub api_key_configured: bool,
    /// Configured model identifier.
    pub model: String,
    /// API base URL.
    pub endpoint: String,
    /// Outbound `HTTP-Referer` value, if any.
    pub public_url: Option<String>,
    /// Upstream request timeout.
    pub timeout_secs: u64,
}

impl ConfigHealth {
    pub fn from_config(cfg: &CompletionConfig) -> Self {
        Self {
            api_key_configured: cfg.has_api_key(),
            model: cfg.model.clone(),
            endpoint: cfg.endpoint.clone(),
            public_url: cfg.public_url.clone(),
            timeout_secs: cfg.timeout_secs_or_default(),
        }
    }

    /// `"ok"` when requests can be attempted, `"degraded"` otherwise.
    pub fn status(&self) -> &'static str {
        if self.api_key_configured {
            "ok"
        } else {
            "degraded"
        }
    }
}
