use std::sync::Arc;

use async_trait::async_trait;
use telemetry::{instrument, Operation, SharedMetrics};

use crate::api::ApiEmbedder;
use crate::stub::StubEmbedder;
use crate::{EmbeddingMode, SemanticConfig, SemanticError};

/// Turns text into fixed-length vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, SemanticError>;

    /// One vector per input, in input order. An empty slice yields an empty
    /// vector without contacting the provider.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

pub type SharedProvider = Arc<dyn EmbeddingProvider>;

/// Reports every call on the wrapped provider as an `embed` operation.
pub struct InstrumentedEmbedder {
    inner: SharedProvider,
    metrics: SharedMetrics,
}

impl InstrumentedEmbedder {
    pub fn new(inner: SharedProvider, metrics: SharedMetrics) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl EmbeddingProvider for InstrumentedEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        instrument(
            self.metrics.as_ref(),
            Operation::Embed,
            |_: &Vec<f32>| 1,
            self.inner.embed_one(text),
        )
        .await
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        instrument(
            self.metrics.as_ref(),
            Operation::Embed,
            |vectors: &Vec<Vec<f32>>| vectors.len(),
            self.inner.embed_many(texts),
        )
        .await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Validate `cfg` and construct the provider it selects.
pub fn build_provider(cfg: &SemanticConfig) -> Result<SharedProvider, SemanticError> {
    cfg.validate()?;
    let provider: SharedProvider = match cfg.mode {
        EmbeddingMode::Fast => Arc::new(StubEmbedder::from_config(cfg)),
        EmbeddingMode::Api => Arc::new(ApiEmbedder::new(cfg.clone())?),
    };
    tracing::info!(
        mode = ?cfg.mode,
        model = provider.model_name(),
        dimension = provider.dimension(),
        "embedding provider ready"
    );
    Ok(provider)
}

/// [`build_provider`] wrapped in an [`InstrumentedEmbedder`].
pub fn build_instrumented_provider(
    cfg: &SemanticConfig,
    metrics: SharedMetrics,
) -> Result<SharedProvider, SemanticError> {
    let inner = build_provider(cfg)?;
    Ok(Arc::new(InstrumentedEmbedder::new(inner, metrics)))
}
