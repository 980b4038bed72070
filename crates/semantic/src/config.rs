use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;
use crate::SemanticError;

/// Which provider [`build_provider`](crate::build_provider) constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    /// Deterministic local vectors; no network.
    #[default]
    Fast,
    /// OpenAI-compatible HTTP endpoint.
    Api,
}

/// Remote payload/response dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    /// `{"input": [...], "model": ...}` → `{"data": [{"embedding": [...]}]}`
    #[default]
    OpenAi,
    /// `{"inputs": [...]}` → bare arrays
    Hf,
    /// `{"texts": [...]}` → `{"embeddings": [...]}`
    Custom,
}

/// Embedding provider settings.
///
/// # Example
/// ```
/// use semantic::{EmbeddingMode, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     mode: EmbeddingMode::Api,
///     api_url: Some("https://api.openai.com/v1/embeddings".into()),
///     api_auth_header: Some("Bearer sk-test".into()),
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    pub mode: EmbeddingMode,
    /// Sent as `model` to OpenAI endpoints and reported by the provider.
    pub model_name: String,
    /// Length every returned vector must have.
    pub dimension: usize,
    /// Maximum texts per HTTP request.
    pub batch_size: usize,
    pub api_url: Option<String>,
    /// Full `Authorization` header value, e.g. `"Bearer sk-..."`.
    pub api_auth_header: Option<String>,
    pub api_provider: ApiProvider,
    pub api_timeout_secs: u64,
    /// Scale vectors to unit length.
    pub normalize: bool,
    pub retry: RetryConfig,
    /// Retry transient API failures. When false every request is attempted once.
    pub enable_resilience: bool,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: EmbeddingMode::Fast,
            model_name: "text-embedding-3-small".into(),
            dimension: 1536,
            batch_size: 64,
            api_url: None,
            api_auth_header: None,
            api_provider: ApiProvider::OpenAi,
            api_timeout_secs: 30,
            normalize: true,
            retry: RetryConfig::default(),
            enable_resilience: true,
        }
    }
}

impl SemanticConfig {
    pub fn with_mode(mut self, mode: EmbeddingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_api_provider(mut self, provider: ApiProvider) -> Self {
        self.api_provider = provider;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> Result<(), SemanticError> {
        if self.dimension == 0 {
            return Err(SemanticError::InvalidConfig(
                "dimension must be greater than zero".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SemanticError::InvalidConfig(
                "batch_size must be greater than zero".into(),
            ));
        }
        if self.mode == EmbeddingMode::Api
            && self.api_url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err(SemanticError::InvalidConfig(
                "api_url is required for api mode".into(),
            ));
        }
        Ok(())
    }
}
