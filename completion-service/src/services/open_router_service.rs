//! OpenRouter chat-completion client.
//!
//! Minimal, non-streaming client around an OpenAI-compatible REST API.
//! The request URL is derived from `CompletionConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions
//!
//! Constructor validation:
//! - `cfg.api_key` must be present
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Status codes and response shapes are classified into [`CompletionError`];
//! nothing is retried.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    config::completion_config::CompletionConfig,
    error_handler::{CompletionError, ConfigError, make_snippet},
    services::CompletionBackend,
};

/// Thin client for an OpenRouter-compatible API.
///
/// Keeps a preconfigured `reqwest::Client` (timeout + default headers) and is
/// meant to be built once and shared behind an `Arc`.
#[derive(Debug)]
pub struct OpenRouterService {
    client: reqwest::Client,
    cfg: CompletionConfig,
    url_chat: String,
    timeout: Duration,
}

impl OpenRouterService {
    /// Creates a new [`OpenRouterService`] from the given config.
    ///
    /// # Errors
    /// - [`CompletionError::MissingApiKey`] if `cfg.api_key` is missing or blank
    /// - [`CompletionError::Config`] if `cfg.endpoint` is not http(s) or a
    ///   header value is invalid
    /// - [`CompletionError::ClientBuild`] if the HTTP client cannot be built
    pub fn new(cfg: CompletionConfig) -> Result<Self, CompletionError> {
        // 1) API key must be present.
        let api_key = cfg
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(CompletionError::MissingApiKey)?;

        // 2) Endpoint must use http/https.
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidFormat {
                var: "OPENROUTER_ENDPOINT",
                reason: "must start with http:// or https://",
            }
            .into());
        }

        // 3) HTTP client: timeout + default headers.
        let timeout = Duration::from_secs(cfg.timeout_secs_or_default());

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            ConfigError::InvalidFormat {
                var: "OPENROUTER_API_KEY",
                reason: "contains characters not allowed in an HTTP header",
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(url) = &cfg.public_url {
            let referer = header::HeaderValue::from_str(url).map_err(|_| {
                ConfigError::InvalidFormat {
                    var: "PUBLIC_URL",
                    reason: "contains characters not allowed in an HTTP header",
                }
            })?;
            headers.insert("HTTP-Referer", referer);
        }
        if let Ok(title) = header::HeaderValue::from_str(&cfg.app_title) {
            headers.insert("X-Title", title);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(CompletionError::ClientBuild)?;

        let url_chat = format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'));

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "OpenRouterService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            timeout,
        })
    }

    /// Performs a **non-streaming** chat completion for `question`.
    ///
    /// The request carries the configured system prompt followed by the user
    /// message, plus `max_tokens`, `temperature` and `top_p` from config.
    ///
    /// # Errors
    /// - [`CompletionError::Timeout`] / [`CompletionError::Network`] for
    ///   transport failures
    /// - [`CompletionError::Auth`], [`CompletionError::NotFound`],
    ///   [`CompletionError::RateLimited`], [`CompletionError::Upstream`] for
    ///   non-2xx statuses
    /// - [`CompletionError::EmptyResponse`] if the body is undecodable, has no
    ///   choices, or the content is blank
    pub async fn generate(&self, question: &str) -> Result<String, CompletionError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, question);

        debug!(
            model = %self.cfg.model,
            question_len = question.len(),
            "POST {}", self.url_chat
        );

        let resp = self
            .client
            .post(&self.url_chat)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let err = CompletionError::from_transport(e, self.timeout);
                error!(
                    error = %err,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "chat completion transport failure"
                );
                err
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CompletionError::from_transport(e, self.timeout))?;

        if !status.is_success() {
            let err = CompletionError::from_status(status, self.url_chat.clone(), &text);
            error!(
                %status,
                url = %self.url_chat,
                snippet = %make_snippet(&text),
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned non-success status"
            );
            return Err(err);
        }

        let out: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(
                error = %e,
                snippet = %make_snippet(&text),
                latency_ms = started.elapsed().as_millis(),
                "failed to decode chat completion response"
            );
            CompletionError::EmptyResponse(format!(
                "serde error: {e}; expected `choices[0].message.content`"
            ))
        })?;

        let content = extract_answer(out)?;

        info!(
            model = %self.cfg.model,
            answer_len = content.len(),
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(content)
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterService {
    async fn complete(&self, question: &str) -> Result<String, CompletionError> {
        self.generate(question).await
    }

    fn model(&self) -> &str {
        &self.cfg.model
    }
}

/// Picks the first choice and returns its trimmed content.
fn extract_answer(out: ChatCompletionResponse) -> Result<String, CompletionError> {
    let first = out
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::EmptyResponse("no choices in response".into()))?;

    let content = first
        .message
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(CompletionError::EmptyResponse(
            "first choice has empty content".into(),
        ));
    }
    Ok(content)
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_cfg(cfg: &'a CompletionConfig, question: &'a str) -> Self {
        Self {
            model: &cfg.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &cfg.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Minimal response for `/v1/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageOut>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
