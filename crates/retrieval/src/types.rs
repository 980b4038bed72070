use index::IndexError;
use semantic::SemanticError;
use thiserror::Error;

/// Failure of a similarity-store operation.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Caller input rejected before embedding or persistence.
    #[error("invalid request: {0}")]
    Validation(String),
    /// The embedding provider failed; nothing was persisted.
    #[error("embedding provider failed: {0}")]
    Provider(#[from] SemanticError),
    #[error("clause storage failed: {0}")]
    Storage(IndexError),
}

impl From<IndexError> for RetrievalError {
    fn from(err: IndexError) -> Self {
        if err.is_validation() {
            RetrievalError::Validation(err.to_string())
        } else {
            RetrievalError::Storage(err)
        }
    }
}

impl RetrievalError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RetrievalError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_errors_split_by_kind() {
        let err: RetrievalError = IndexError::DimensionMismatch {
            expected: 4,
            got: 3,
        }
        .into();
        assert!(err.is_validation());
        assert!(err.to_string().contains("expected 4, got 3"));

        let err: RetrievalError = IndexError::backend("disk full").into();
        assert!(matches!(err, RetrievalError::Storage(_)));
    }
}
