use std::fmt;

/// Default OpenRouter API base; the client appends `/v1/chat/completions`.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

/// System instruction sent ahead of every user question.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
Answer the user's question clearly and concisely. \
If you are not sure about something, say so instead of guessing.";

/// Upstream request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Value of the outbound `X-Title` header.
pub const DEFAULT_APP_TITLE: &str = "Ask Relay";

/// Configuration for the chat-completion client.
///
/// Built once at start-up (see [`crate::config::default_config`]) and then
/// shared read-only. The `Debug` impl redacts `api_key`.
///
/// # Examples
///
/// ```
/// use completion_service::config::completion_config::CompletionConfig;
///
/// let cfg = CompletionConfig {
///     api_key: Some("sk-or-...".to_string()),
///     model: "openai/gpt-4o-mini".to_string(),
///     ..CompletionConfig::default()
/// };
/// assert_eq!(cfg.timeout_secs, Some(30));
/// ```
#[derive(Clone, PartialEq)]
pub struct CompletionConfig {
    /// Model identifier string (e.g., `"mistralai/mistral-7b-instruct"`).
    pub model: String,

    /// API base URL (scheme + host + optional path prefix).
    pub endpoint: String,

    /// Bearer credential. `None` means requests must not be attempted.
    pub api_key: Option<String>,

    /// Externally-reachable URL of this service, sent as `HTTP-Referer`.
    pub public_url: Option<String>,

    /// Application name sent as `X-Title`.
    pub app_title: String,

    /// System message placed before the user question.
    pub system_prompt: String,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl CompletionConfig {
    /// `true` when a credential is present.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Configured timeout, or [`DEFAULT_TIMEOUT_SECS`].
    pub fn timeout_secs_or_default(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            public_url: None,
            app_title: DEFAULT_APP_TITLE.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: Some(512),
            temperature: Some(0.7),
            top_p: Some(0.9),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("public_url", &self.public_url)
            .field("app_title", &self.app_title)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}
