use serde::{Deserialize, Serialize};

/// Request payload for `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Free-text question. A missing field is treated like an empty one.
    #[serde(default)]
    pub question: String,
}

/// Success payload for `POST /ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// Trimmed model answer.
    pub response: String,
}
