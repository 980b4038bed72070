use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use retrieval::SimilarityStore;

use crate::EvalError;

/// Produces an answer for one golden-set question.
#[async_trait]
pub trait AnswerFn: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String, EvalError>;
}

#[async_trait]
impl<F, Fut, E> AnswerFn for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    async fn answer(&self, question: &str) -> Result<String, EvalError> {
        (self)(question.to_owned())
            .await
            .map_err(|e| EvalError::Answer(e.to_string()))
    }
}

/// Answers with the text of the closest stored clauses.
pub struct RetrievalAnswerer {
    store: Arc<SimilarityStore>,
    k: usize,
}

impl RetrievalAnswerer {
    pub fn new(store: Arc<SimilarityStore>, k: usize) -> Self {
        Self { store, k }
    }
}

#[async_trait]
impl AnswerFn for RetrievalAnswerer {
    async fn answer(&self, question: &str) -> Result<String, EvalError> {
        let hits = self.store.search(question, self.k).await?;
        if hits.is_empty() {
            return Err(EvalError::Answer(format!(
                "no stored clause matches {question:?}"
            )));
        }
        Ok(hits
            .into_iter()
            .map(|hit| hit.text)
            .collect::<Vec<_>>()
            .join(" "))
    }
}
