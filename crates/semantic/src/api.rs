use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::provider::EmbeddingProvider;
use crate::retry::retry_async;
use crate::vector::l2_normalize_in_place;
use crate::{ApiProvider, SemanticConfig, SemanticError};

/// HTTP embedder for OpenAI-compatible, Hugging Face and custom endpoints.
///
/// Owns its connection pool. Inputs are sent in chunks of `batch_size`; each
/// chunk is retried independently when resilience is enabled.
pub struct ApiEmbedder {
    client: reqwest::Client,
    url: String,
    cfg: SemanticConfig,
}

impl ApiEmbedder {
    pub fn new(cfg: SemanticConfig) -> Result<Self, SemanticError> {
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| SemanticError::InvalidConfig("api_url is required for api mode".into()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.api_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| SemanticError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { client, url, cfg })
    }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        let payload = build_payload(self.cfg.api_provider, texts, &self.cfg.model_name);
        let response = if self.cfg.enable_resilience {
            let (this, payload) = (self, &payload);
            retry_async(&self.cfg.retry, move |attempt| {
                if attempt > 0 {
                    tracing::warn!(attempt, url = %this.url, "retrying embedding request");
                }
                this.send(payload)
            })
            .await?
        } else {
            self.send(&payload).await?
        };

        let mut vectors = parse_embeddings(response)?;
        if vectors.len() != texts.len() {
            return Err(SemanticError::CountMismatch {
                expected: texts.len(),
                got: vectors.len(),
            });
        }
        for vector in vectors.iter_mut() {
            if vector.len() != self.cfg.dimension {
                return Err(SemanticError::DimensionMismatch {
                    expected: self.cfg.dimension,
                    got: vector.len(),
                });
            }
            if self.cfg.normalize {
                l2_normalize_in_place(vector);
            }
        }
        Ok(vectors)
    }

    async fn send(&self, payload: &Value) -> Result<Value, SemanticError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(header) = self.cfg.api_auth_header.as_deref() {
            request = request.header(reqwest::header::AUTHORIZATION, header);
        }

        let response = request.send().await.map_err(SemanticError::request)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| SemanticError::InvalidResponse(format!("invalid JSON: {e}")))
    }
}

#[async_trait]
impl EmbeddingProvider for ApiEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let mut vectors = self.embed_chunk(&[text.to_string()]).await?;
        vectors.pop().ok_or(SemanticError::CountMismatch {
            expected: 1,
            got: 0,
        })
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.cfg.batch_size.max(1)) {
            out.extend(self.embed_chunk(chunk).await?);
        }
        tracing::debug!(inputs = texts.len(), "embedded batch via api");
        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.cfg.dimension
    }

    fn model_name(&self) -> &str {
        &self.cfg.model_name
    }
}

pub(crate) fn build_payload(provider: ApiProvider, texts: &[String], model: &str) -> Value {
    match provider {
        ApiProvider::OpenAi => json!({ "input": texts, "model": model }),
        ApiProvider::Hf => json!({ "inputs": texts }),
        ApiProvider::Custom => json!({ "texts": texts }),
    }
}

/// Accepts `{"data": [{"embedding": [..]}]}`, `{"embeddings": [[..]]}`, a bare
/// list of vectors, or a single bare vector.
pub(crate) fn parse_embeddings(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_collection(embeddings);
            }
            if let Some(Value::Array(items)) = map.remove("data") {
                let mut indexed = Vec::with_capacity(items.len());
                for (position, item) in items.into_iter().enumerate() {
                    let Value::Object(mut obj) = item else {
                        return Err(SemanticError::invalid_response(
                            "unexpected entry inside `data` array",
                        ));
                    };
                    let embedding = obj.remove("embedding").ok_or_else(|| {
                        SemanticError::invalid_response("missing `embedding` field in data item")
                    })?;
                    let index = obj
                        .get("index")
                        .and_then(Value::as_u64)
                        .map_or(position, |i| i as usize);
                    indexed.push((index, parse_vector(embedding)?));
                }
                indexed.sort_by_key(|(index, _)| *index);
                return Ok(indexed.into_iter().map(|(_, v)| v).collect());
            }
            Err(SemanticError::invalid_response("unsupported response shape"))
        }
        other => parse_collection(other),
    }
}

fn parse_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        Value::Array(items) if items.iter().all(Value::is_array) => {
            items.into_iter().map(parse_vector).collect()
        }
        other => parse_vector(other).map(|v| vec![v]),
    }
}

fn parse_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    let values = match value {
        Value::Array(values) => values,
        other => {
            return Err(SemanticError::InvalidResponse(format!(
                "embedding must be an array, got {other}"
            )))
        }
    };
    values
        .into_iter()
        .map(|entry| {
            entry.as_f64().map(|f| f as f32).ok_or_else(|| {
                SemanticError::InvalidResponse(format!("embedding entries must be numbers, got {entry}"))
            })
        })
        .collect()
}
