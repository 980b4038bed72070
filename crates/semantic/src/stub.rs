use async_trait::async_trait;
use fxhash::hash64;

use crate::provider::EmbeddingProvider;
use crate::vector::l2_normalize_in_place;
use crate::{SemanticConfig, SemanticError};

/// Deterministic local embedder used in `fast` mode and in tests.
///
/// Lowercase alphanumeric tokens are feature-hashed into the vector, so texts
/// that share words point in similar directions. Text without any token falls
/// back to a sinusoid seeded by the hash of the raw bytes. Identical input
/// always yields an identical vector.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
    model_name: String,
    normalize: bool,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_name: "stub-hash".into(),
            normalize: true,
        }
    }

    pub fn from_config(cfg: &SemanticConfig) -> Self {
        Self {
            dimension: cfg.dimension,
            model_name: format!("stub:{}", cfg.model_name),
            normalize: cfg.normalize,
        }
    }

    /// Synchronous core, shared by both trait methods.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        if self.dimension == 0 {
            return v;
        }

        let mut any_token = false;
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            any_token = true;
            let h = hash64(token.to_lowercase().as_bytes());
            let idx = (h % self.dimension as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }

        if !any_token {
            let h = hash64(text.as_bytes());
            for (idx, value) in v.iter_mut().enumerate() {
                *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
            }
        }

        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        Ok(self.vector_for(text))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::cosine;

    #[test]
    fn identical_text_identical_vector() {
        let stub = StubEmbedder::new(64);
        assert_eq!(stub.vector_for("Net 30 payment"), stub.vector_for("Net 30 payment"));
    }

    #[test]
    fn vectors_have_configured_length_and_unit_norm() {
        let stub = StubEmbedder::new(1536);
        let v = stub.vector_for("The Company shall have unlimited liability.");
        assert_eq!(v.len(), 1536);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_words_are_closer_than_disjoint_ones() {
        let stub = StubEmbedder::new(256);
        let q = stub.vector_for("payment terms");
        let near = stub.vector_for("Payment terms are Net 30 days from invoice date.");
        let far = stub.vector_for("Either party may terminate this agreement.");
        assert!(cosine(&q, &near) > cosine(&q, &far));
    }

    #[test]
    fn punctuation_only_text_still_gets_a_vector() {
        let stub = StubEmbedder::new(32);
        let v = stub.vector_for("--- ... ---");
        assert!(v.iter().any(|x| *x != 0.0));
    }

    #[tokio::test]
    async fn trait_methods_agree() {
        let stub = StubEmbedder::from_config(&SemanticConfig::default().with_dimension(16));
        let texts = vec!["one".to_string(), "two".to_string()];
        let many = stub.embed_many(&texts).await.unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1], stub.embed_one("two").await.unwrap());
        assert!(stub.embed_many(&[]).await.unwrap().is_empty());
        assert_eq!(stub.dimension(), 16);
        assert_eq!(stub.model_name(), "stub:text-embedding-3-small");
    }
}
