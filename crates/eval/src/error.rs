use std::path::PathBuf;

use retrieval::RetrievalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("failed to access golden set {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed golden set: {0}")]
    Format(#[from] serde_json::Error),
    #[error("invalid golden set: {0}")]
    InvalidGoldenSet(String),
    /// The answer function failed for one item.
    #[error("answer failed: {0}")]
    Answer(String),
    /// The external judge failed; the run has no scores.
    #[error("judge failed: {0}")]
    Judge(String),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

impl EvalError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EvalError::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors that come from a remote collaborator rather than local input.
    pub fn is_provider(&self) -> bool {
        match self {
            EvalError::Answer(_) | EvalError::Judge(_) => true,
            EvalError::Retrieval(err) => !err.is_validation(),
            _ => false,
        }
    }
}
