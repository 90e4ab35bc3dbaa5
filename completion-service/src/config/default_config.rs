//! Completion config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `OPENROUTER_API_KEY`  = bearer credential (optional here; its absence is
//!   reported per request)
//! - `OPENROUTER_MODEL`    = model identifier
//! - `OPENROUTER_ENDPOINT` = API base, must be http(s)
//! - `PUBLIC_URL`          = value for the outbound `HTTP-Referer` header
//! - `LLM_MAX_TOKENS`      = max output tokens (u32)
//! - `LLM_TIMEOUT_SECS`    = request timeout (u64)

use tracing::{debug, warn};

use crate::{
    config::completion_config::CompletionConfig,
    error_handler::{ConfigError, env_opt, env_opt_u32, env_opt_u64, validate_http_endpoint},
};

/// Builds the OpenRouter config from the environment, falling back to
/// [`CompletionConfig::default`] for every unset variable.
///
/// # Errors
///
/// - [`ConfigError::InvalidNumber`] for malformed numeric variables
/// - [`ConfigError::InvalidFormat`] if `OPENROUTER_ENDPOINT` or `PUBLIC_URL`
///   is not http(s)
pub fn config_openrouter() -> Result<CompletionConfig, ConfigError> {
    let defaults = CompletionConfig::default();

    let endpoint = env_opt("OPENROUTER_ENDPOINT").unwrap_or(defaults.endpoint);
    validate_http_endpoint("OPENROUTER_ENDPOINT", &endpoint)?;

    let model = env_opt("OPENROUTER_MODEL").unwrap_or(defaults.model);

    let api_key = env_opt("OPENROUTER_API_KEY");
    if api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; /ask will answer with a configuration error");
    }

    let public_url = env_opt("PUBLIC_URL");
    if let Some(url) = &public_url {
        validate_http_endpoint("PUBLIC_URL", url)?;
    }

    let cfg = CompletionConfig {
        model,
        endpoint,
        api_key,
        public_url,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?.or(defaults.max_tokens),
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?.or(defaults.timeout_secs),
        ..defaults
    };

    debug!(config = ?cfg, "completion config loaded");
    Ok(cfg)
}
