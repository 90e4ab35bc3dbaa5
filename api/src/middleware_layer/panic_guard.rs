use std::any::Any;

use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error_handler::AskError;

/// Turns a handler panic into the generic `INTERNAL_ERROR` JSON response.
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };

    error!(panic = detail, "request handler panicked");
    AskError::Internal.into_response()
}
