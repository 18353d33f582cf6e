//! Error types for the dev tagger.
//!
//! Nothing in here ever escapes the plugin surface: the driver turns every
//! [`TaggerError`] into a log line plus a counter bump and passes the file
//! through unmodified.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("refusing to write outside the project root: {0}")]
    PathOutsideRoot(PathBuf),

    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl TaggerError {
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }
}
