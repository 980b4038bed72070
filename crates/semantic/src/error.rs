use thiserror::Error;

/// Errors surfaced by embedding providers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g. `api` mode without an endpoint).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// Transport-level failure: connect, timeout, TLS.
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The endpoint answered with a non-success status.
    #[error("embedding endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The provider answered, but the payload could not be used.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
    /// A returned vector has the wrong length.
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// The provider returned a different number of vectors than inputs.
    #[error("provider returned {got} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

impl SemanticError {
    pub fn request<E: std::fmt::Display>(err: E) -> Self {
        Self::Request(err.to_string())
    }

    pub fn invalid_response<E: std::fmt::Display>(err: E) -> Self {
        Self::InvalidResponse(err.to_string())
    }

    /// Transient failures worth another attempt: transport errors, 429 and 5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            SemanticError::Request(_) => true,
            SemanticError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
