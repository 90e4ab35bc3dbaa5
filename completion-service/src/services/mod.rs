pub mod open_router_service;

use async_trait::async_trait;

use crate::error_handler::CompletionError;

/// A backend able to answer a single question.
///
/// The HTTP layer depends on this trait rather than on a concrete client so
/// the handler can be driven by an in-memory backend in tests.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the trimmed, non-empty answer to `question`.
    async fn complete(&self, question: &str) -> Result<String, CompletionError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}
