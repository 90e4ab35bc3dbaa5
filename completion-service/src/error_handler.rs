//! Unified error handling for `completion-service`.
//!
//! [`CompletionError`] is the single error type returned by the client. Each
//! upstream failure class (timeout, transport, 401, 404, 429, other non-2xx,
//! unusable 2xx body) has its own variant so callers can translate it into a
//! user-facing response without inspecting strings.
//!
//! Environment helpers used by the config loader live here as well and return
//! [`ConfigError`].
//!
//! All messages carry the `[Completion Service]` prefix to simplify attribution
//! in logs.

use std::{fmt, time::Duration};

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Maximum number of characters kept from an upstream body for logs/errors.
const SNIPPET_MAX_CHARS: usize = 300;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Error returned by a completion backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No credential configured; no request was attempted.
    #[error("[Completion Service] API key is not configured")]
    MissingApiKey,

    /// The request did not complete within the configured timeout.
    #[error("[Completion Service] request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS, TLS or body-read failure.
    #[error("[Completion Service] network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Upstream answered 401: the credential was rejected.
    #[error("[Completion Service] credential rejected: {0}")]
    Auth(HttpError),

    /// Upstream answered 404, usually an unknown model identifier.
    #[error("[Completion Service] not found: {message}")]
    NotFound {
        /// Upstream-provided message, or a generic fallback.
        message: String,
        /// Raw status details.
        http: HttpError,
    },

    /// Upstream answered 429.
    #[error("[Completion Service] rate limited: {0}")]
    RateLimited(HttpError),

    /// Any other non-success status.
    #[error("[Completion Service] upstream failure: {0}")]
    Upstream(HttpError),

    /// 2xx response without a usable answer (no choices, empty content,
    /// undecodable JSON).
    #[error("[Completion Service] empty or unusable response: {0}")]
    EmptyResponse(String),

    /// Invalid environment configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed.
    #[error("[Completion Service] failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl CompletionError {
    /// Classifies a non-success HTTP status into the matching variant.
    ///
    /// For 404 the upstream `error.message` (or top-level `message`) is
    /// surfaced when the body carries one.
    pub fn from_status(status: StatusCode, url: impl Into<String>, body: &str) -> Self {
        let http = HttpError {
            status,
            url: url.into(),
            snippet: make_snippet(body),
        };

        match status {
            StatusCode::UNAUTHORIZED => CompletionError::Auth(http),
            StatusCode::NOT_FOUND => CompletionError::NotFound {
                message: upstream_message(body)
                    .unwrap_or_else(|| "model or resource not found".to_string()),
                http,
            },
            StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited(http),
            _ => CompletionError::Upstream(http),
        }
    }

    /// Classifies a transport failure: timeouts are kept apart from every
    /// other network error.
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout(timeout)
        } else {
            CompletionError::Network(err)
        }
    }

    /// `true` when retrying the same request later can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::Timeout(_)
                | CompletionError::Network(_)
                | CompletionError::RateLimited(_)
                | CompletionError::Upstream(_)
        )
    }
}

/// Status details of a failed upstream call.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// HTTP status returned by the upstream.
    pub status: StatusCode,
    /// Request URL.
    pub url: String,
    /// Trimmed, length-capped snippet of the response body.
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// Trims a response body and caps it at a fixed number of characters.
pub fn make_snippet(body: &str) -> String {
    let trimmed = body.trim();
    let mut out: String = trimmed.chars().take(SNIPPET_MAX_CHARS).collect();
    if trimmed.chars().count() > SNIPPET_MAX_CHARS {
        out.push('…');
    }
    out
}

/// Extracts `error.message` or `message` from an OpenAI-style error body.
fn upstream_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Inner {
        message: Option<String>,
    }
    #[derive(Deserialize)]
    struct Envelope {
        error: Option<Inner>,
        message: Option<String>,
    }

    let env: Envelope = serde_json::from_str(body).ok()?;
    env.error
        .and_then(|e| e.message)
        .or(env.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Errors raised while loading configuration from the environment.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (ports, limits, timeouts).
    #[error("[Completion Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_MAX_TOKENS`, `PORT`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u32`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[Completion Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `OPENROUTER_ENDPOINT`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Env helpers                                                               */
/* ------------------------------------------------------------------------- */

/// Returns a trimmed, non-empty environment variable (`None` if unset/empty).
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
pub fn env_opt_u32(name: &'static str) -> std::result::Result<Option<u32>, ConfigError> {
    env_opt(name)
        .map(|v| {
            v.parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        })
        .transpose()
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
pub fn env_opt_u64(name: &'static str) -> std::result::Result<Option<u64>, ConfigError> {
    env_opt(name)
        .map(|v| {
            v.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        })
        .transpose()
}

/// Parses an optional TCP port from env (`Ok(None)` if unset/empty).
pub fn env_opt_port(name: &'static str) -> std::result::Result<Option<u16>, ConfigError> {
    env_opt(name)
        .map(|v| {
            v.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
                var: name,
                reason: "expected u16 (1..=65535)",
            })
        })
        .transpose()
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
pub fn validate_http_endpoint(
    var: &'static str,
    value: &str,
) -> std::result::Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let url = "http://upstream/v1/chat/completions";
        assert!(matches!(
            CompletionError::from_status(StatusCode::UNAUTHORIZED, url, ""),
            CompletionError::Auth(_)
        ));
        assert!(matches!(
            CompletionError::from_status(StatusCode::TOO_MANY_REQUESTS, url, ""),
            CompletionError::RateLimited(_)
        ));
        assert!(matches!(
            CompletionError::from_status(StatusCode::INTERNAL_SERVER_ERROR, url, "boom"),
            CompletionError::Upstream(_)
        ));
        assert!(matches!(
            CompletionError::from_status(StatusCode::BAD_REQUEST, url, ""),
            CompletionError::Upstream(_)
        ));
    }

    #[test]
    fn not_found_surfaces_upstream_message() {
        let body = r#"{"error":{"message":"No endpoints found for foo/bar","code":404}}"#;
        match CompletionError::from_status(StatusCode::NOT_FOUND, "u", body) {
            CompletionError::NotFound { message, http } => {
                assert_eq!(message, "No endpoints found for foo/bar");
                assert_eq!(http.status, StatusCode::NOT_FOUND);
            }
            other => panic!("unexpected: {other:?}"),
        }

        match CompletionError::from_status(StatusCode::NOT_FOUND, "u", "<html>") {
            CompletionError::NotFound { message, .. } => {
                assert_eq!(message, "model or resource not found");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn snippet_is_trimmed_and_capped() {
        assert_eq!(make_snippet("  hi \n"), "hi");
        let long = "x".repeat(SNIPPET_MAX_CHARS + 10);
        let s = make_snippet(&long);
        assert_eq!(s.chars().count(), SNIPPET_MAX_CHARS + 1);
        assert!(s.ends_with('…'));
    }

    #[test]
    fn retryable_classes() {
        let http = HttpError {
            status: StatusCode::TOO_MANY_REQUESTS,
            url: "u".into(),
            snippet: String::new(),
        };
        assert!(CompletionError::RateLimited(http.clone()).is_retryable());
        assert!(CompletionError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!CompletionError::Auth(http).is_retryable());
        assert!(!CompletionError::MissingApiKey.is_retryable());
    }
}
