//! Append-only text log of question/answer exchanges.
//!
//! Each exchange becomes one record:
//!
//! ```text
//! [2025-01-31 14:02:11]
//! Q: What is 2+2?
//! A: 4
//! --------------------------------------------------
//!
//! ```
//!
//! Multi-line questions and answers keep one header line each; continuation
//! lines are indented by three spaces.
//!
//! Writing is best-effort: [`HistoryLog::append`] never fails, it reports the
//! outcome as an [`AppendOutcome`] and logs failures at `warn`.

pub mod errors;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{debug, warn};

pub use errors::HistoryError;

/// Separator line closing every record.
pub const SEPARATOR: &str = "--------------------------------------------------";

/// One question/answer pair plus the time it was answered.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub timestamp: DateTime<Local>,
    pub question: String,
    pub answer: String,
}

impl Exchange {
    /// Exchange stamped with the current local time.
    pub fn now(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Renders the full record, trailing blank line included.
    pub fn render(&self) -> String {
        format!(
            "[{}]\nQ: {}\nA: {}\n{}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            indent_continuation(&self.question),
            indent_continuation(&self.answer),
            SEPARATOR
        )
    }
}

/// Indents every line after the first so it lines up under the `Q: `/`A: `
/// prefix.
fn indent_continuation(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join("\n   ")
}

/// Result of a best-effort append.
#[derive(Debug)]
pub enum AppendOutcome {
    Written,
    Skipped(HistoryError),
}

impl AppendOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, AppendOutcome::Written)
    }
}

/// Handle to the history file. Cheap to clone; holds no open descriptor.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `exchange`, swallowing and logging any I/O failure.
    pub async fn append(&self, exchange: &Exchange) -> AppendOutcome {
        match self.try_append(exchange).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "exchange appended to history");
                AppendOutcome::Written
            }
            Err(err) => {
                warn!(error = %err, "history append skipped");
                AppendOutcome::Skipped(err)
            }
        }
    }

    /// Appends `exchange` as a single write on an append-mode handle.
    ///
    /// The file is opened and closed on every call. Concurrent writers rely on
    /// `O_APPEND` for per-record atomicity.
    pub async fn try_append(&self, exchange: &Exchange) -> Result<(), HistoryError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| HistoryError::Open {
                path: self.path.clone(),
                source,
            })?;

        let write_err = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        file.write_all(exchange.render().as_bytes())
            .await
            .map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_exchange(q: &str, a: &str) -> Exchange {
        Exchange {
            timestamp: Local.with_ymd_and_hms(2025, 1, 31, 14, 2, 11).unwrap(),
            question: q.into(),
            answer: a.into(),
        }
    }

    #[test]
    fn record_layout() {
        let rec = fixed_exchange("What is 2+2?", "4").render();
        assert_eq!(
            rec,
            format!("[2025-01-31 14:02:11]\nQ: What is 2+2?\nA: 4\n{SEPARATOR}\n\n")
        );
    }

    #[test]
    fn multi_line_answer_is_indented() {
        let rec = fixed_exchange("List two\nprimes", "1. 2\r\n2. 3\n\nDone.").render();
        assert_eq!(
            rec,
            format!(
                "[2025-01-31 14:02:11]\nQ: List two\n   primes\nA: 1. 2\n   2. 3\n   \n   Done.\n{SEPARATOR}\n\n"
            )
        );

        let headers: Vec<_> = rec.lines().filter(|l| !l.starts_with(' ')).collect();
        assert_eq!(headers.len(), 5);
        assert!(headers[1].starts_with("Q: "));
        assert!(headers[2].starts_with("A: "));
        assert_eq!(headers[3], SEPARATOR);
    }

    #[tokio::test]
    async fn appends_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("search_history.txt"));

        assert!(log.append(&fixed_exchange("first?", "one")).await.is_written());
        assert!(log.append(&fixed_exchange("second?", "two")).await.is_written());

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.matches(SEPARATOR).count(), 2);
        assert!(text.find("Q: first?").unwrap() < text.find("Q: second?").unwrap());
        assert!(text.ends_with(&format!("A: two\n{SEPARATOR}\n\n")));
    }

    #[tokio::test]
    async fn unwritable_path_is_skipped_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let log = HistoryLog::new(dir.path());

        match log.append(&fixed_exchange("q", "a")).await {
            AppendOutcome::Skipped(HistoryError::Open { path, .. }) => {
                assert_eq!(path, dir.path());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_appends_keep_records_whole() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("h.txt"));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let log = log.clone();
                tokio::spawn(async move {
                    log.append(&Exchange::now(format!("q{i}"), format!("a{i}")))
                        .await
                        .is_written()
                })
            })
            .collect();
        for t in tasks {
            assert!(t.await.unwrap());
        }

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.matches(SEPARATOR).count(), 16);
        for i in 0..16 {
            assert!(text.contains(&format!("Q: q{i}\nA: a{i}\n")));
        }
    }
}
