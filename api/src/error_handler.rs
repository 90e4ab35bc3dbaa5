use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use completion_service::CompletionError;
use serde::Serialize;
use thiserror::Error;

/// Start-up errors of the HTTP server.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Failure of a single `/ask` call.
///
/// The `Display` text is the sentence shown to the user; [`AskError::code`]
/// and the HTTP status tell retryable failures apart from the rest.
#[derive(Debug, Error)]
pub enum AskError {
    // --- Caller input ---
    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Invalid request: {0}. Send JSON like {{\"question\": \"...\"}}.")]
    BadRequest(String),

    // --- Server configuration ---
    #[error("The server is missing its API key. Check the server configuration.")]
    Configuration,

    #[error("The AI service rejected the server's API key. Check the server configuration.")]
    Auth,

    #[error("The configured model was not found: {0}. Check the server configuration.")]
    ModelNotFound(String),

    // --- Transient ---
    #[error("The request timed out. Please try again.")]
    Timeout,

    #[error("Network error while contacting the AI service. Please try again.")]
    Network,

    #[error("The AI service is receiving too many requests. Please wait a moment and retry.")]
    RateLimited,

    #[error("The AI service is having trouble right now. Please try again later.")]
    Upstream,

    #[error("The AI service returned an empty answer. Try rephrasing your question.")]
    EmptyResponse,

    // --- Anything else ---
    #[error("An unexpected error occurred. Please try again.")]
    Internal,
}

impl AskError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AskError::EmptyQuestion | AskError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AskError::Configuration | AskError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AskError::Auth => StatusCode::UNAUTHORIZED,
            AskError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            AskError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AskError::Network => StatusCode::SERVICE_UNAVAILABLE,
            AskError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AskError::Upstream | AskError::EmptyResponse => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AskError::EmptyQuestion | AskError::BadRequest(_) => "VALIDATION_ERROR",
            AskError::Configuration => "CONFIG_ERROR",
            AskError::Auth => "AUTH_ERROR",
            AskError::ModelNotFound(_) => "MODEL_NOT_FOUND",
            AskError::Timeout => "TIMEOUT",
            AskError::Network => "NETWORK_ERROR",
            AskError::RateLimited => "RATE_LIMITED",
            AskError::Upstream => "UPSTREAM_ERROR",
            AskError::EmptyResponse => "EMPTY_RESPONSE",
            AskError::Internal => "INTERNAL_ERROR",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Missing body, malformed JSON, wrong content type or wrong field types.
impl From<JsonRejection> for AskError {
    fn from(err: JsonRejection) -> Self {
        AskError::BadRequest(err.body_text())
    }
}

impl From<CompletionError> for AskError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::MissingApiKey | CompletionError::Config(_) => AskError::Configuration,
            CompletionError::Timeout(_) => AskError::Timeout,
            CompletionError::Network(_) => AskError::Network,
            CompletionError::Auth(_) => AskError::Auth,
            CompletionError::NotFound { message, .. } => AskError::ModelNotFound(message),
            CompletionError::RateLimited(_) => AskError::RateLimited,
            CompletionError::Upstream(_) => AskError::Upstream,
            CompletionError::EmptyResponse(_) => AskError::EmptyResponse,
            _ => AskError::Internal,
        }
    }
}
