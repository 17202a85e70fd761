use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("e-mail request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("e-mail api returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid e-mail settings: {0}")]
    Invalid(String),
}

impl NotifyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
