use std::sync::Arc;

use index::{ClauseIndex, IndexConfig, IndexStats, NewClause, SimilarityResult, StoreHandle};
use semantic::SharedProvider;
use telemetry::{instrument, Operation, SharedMetrics};

use crate::RetrievalError;


/// Clause collection searchable by meaning.
///
/// `add` embeds a whole batch before touching storage, so an embedding failure
/// leaves the collection unchanged. `search` works on a consistent snapshot:
/// it never observes half of a concurrent batch.
pub struct SimilarityStore {
    provider: SharedProvider,
    index: Arc<ClauseIndex>,
    metrics: SharedMetrics,
}

impl SimilarityStore {
    /// Open the clause index on `store` and pair it with `provider`.
    pub fn open(
        store: &StoreHandle,
        cfg: IndexConfig,
        provider: SharedProvider,
        metrics: SharedMetrics,
    ) -> Result<Self, RetrievalError> {
        if provider.dimension() != cfg.dimension {
            return Err(RetrievalError::Validation(format!(
                "provider `{}` produces {}-dimensional vectors but the index expects {}",
                provider.model_name(),
                provider.dimension(),
                cfg.dimension
            )));
        }
        let index = ClauseIndex::open(store, cfg)?;
        Ok(Self::with_index(Arc::new(index), provider, metrics))
    }

    pub fn with_index(
        index: Arc<ClauseIndex>,
        provider: SharedProvider,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            provider,
            index,
            metrics,
        }
    }

    pub fn index(&self) -> &Arc<ClauseIndex> {
        &self.index
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    /// Embed and persist `clauses` as one unit; returns their ids in order.
    pub async fn add(&self, clauses: Vec<NewClause>) -> Result<Vec<u64>, RetrievalError> {
        if clauses.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(position) = clauses.iter().position(|c| c.text.trim().is_empty()) {
            return Err(RetrievalError::Validation(format!(
                "clause {position} has empty text"
            )));
        }

        let texts: Vec<String> = clauses.iter().map(|c| c.text.clone()).collect();
        let vectors = self.provider.embed_many(&texts).await?;
        if vectors.len() != clauses.len() {
            return Err(RetrievalError::Provider(
                semantic::SemanticError::CountMismatch {
                    expected: clauses.len(),
                    got: vectors.len(),
                },
            ));
        }

        tracing::debug!(
            clauses = clauses.len(),
            model = self.provider.model_name(),
            "batch embedded"
        );
        let items: Vec<(NewClause, Vec<f32>)> = clauses.into_iter().zip(vectors).collect();
        let index = Arc::clone(&self.index);
        instrument(
            self.metrics.as_ref(),
            Operation::Insert,
            |ids: &Vec<u64>| ids.len(),
            async move {
                tokio::task::spawn_blocking(move || index.insert_batch(items))
                    .await
                    .map_err(|e| RetrievalError::Storage(index::IndexError::backend(e)))?
                    .map_err(RetrievalError::from)
            },
        )
        .await
    }

    /// The `k` stored clauses most similar to `query`, best first.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<SimilarityResult>, RetrievalError> {
        if k == 0 {
            return Err(RetrievalError::Validation("k must be at least 1".into()));
        }
        let vector = self.provider.embed_one(query).await?;
        instrument(
            self.metrics.as_ref(),
            Operation::Search,
            |hits: &Vec<SimilarityResult>| hits.len(),
            async { self.index.search(&vector, k).map_err(RetrievalError::from) },
        )
        .await
    }

    pub fn stats(&self) -> Result<IndexStats, RetrievalError> {
        Ok(self.index.stats()?)
    }
}
