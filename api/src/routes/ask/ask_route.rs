//! POST /ask: forwards one question to the completion service.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use history_log::Exchange;
use tracing::{info, instrument, warn};

use crate::{
    core::app_state::AppState,
    error_handler::AskError,
    routes::ask::ask_request::{AskRequest, AskResponse},
};

/// Handler: POST /ask
///
/// Every outcome is a JSON body: `{"response": ...}` on success,
/// `{"error": ..., "code": ...}` otherwise (see [`AskError`]).
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:5000/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is 2+2?"}'
/// ```
#[instrument(name = "ask_route", skip_all)]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AskError> {
    let call = state.stats.begin();

    let result = match payload {
        Ok(Json(body)) => answer_question(&state, &body.question).await,
        Err(rejection) => Err(AskError::from(rejection)),
    };

    match &result {
        Ok(_) => call.answered(),
        Err(err) => {
            drop(call);
            warn!(code = err.code(), status = %err.status_code(), error = %err, "ask failed");
        }
    }

    result.map(|response| Json(AskResponse { response }))
}

/// Validates, throttles, forwards and logs a single question.
///
/// Order matters: empty questions are rejected before the throttle, and the
/// credential check happens before any network I/O.
pub async fn answer_question(state: &AppState, question: &str) -> Result<String, AskError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AskError::EmptyQuestion);
    }

    let waited = state.throttle.acquire().await;

    let backend = state.completion.as_ref().ok_or(AskError::Configuration)?;
    let answer = backend.complete(question).await.map_err(|err| {
        warn!(
            model = backend.model(),
            retryable = err.is_retryable(),
            error = %err,
            "completion failed"
        );
        AskError::from(err)
    })?;

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AskError::EmptyResponse);
    }

    state
        .history
        .append(&Exchange::now(question, answer))
        .await;

    info!(
        model = backend.model(),
        question_len = question.len(),
        answer_len = answer.len(),
        throttled_ms = waited.as_millis(),
        "question answered"
    );

    Ok(answer.to_string())
}
