use std::{io, path::PathBuf};

use thiserror::Error;

/// Failure to persist an exchange. Never propagated to HTTP callers.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to open history file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write history file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
