//! # Clause index
//!
//! Persisted collection of embedded clauses with cosine top-k search.
//!
//! - **Pluggable storage**: [`IndexBackend`] with an in-memory map and a redb
//!   file store. A [`StoreHandle`] is opened once and shared explicitly.
//! - **Compact records**: each [`ClauseRecord`] is bincode-encoded and, by
//!   default, zstd-compressed. Keys are zero-padded ids so the backend's key
//!   order is insertion order.
//! - **Search**: exact scan for small collections, inverted-file partitions
//!   ([`ivf`]) once the collection reaches `min_vectors_for_ivf`.
//!
//! Inserts are batch-atomic: a batch is validated, written in one backend
//! transaction, and only then published to readers.
//!
//! ```
//! use index::{BackendConfig, ClauseIndex, IndexConfig, NewClause, StoreHandle};
//!
//! let store = StoreHandle::open(&BackendConfig::in_memory()).unwrap();
//! let index = ClauseIndex::open(&store, IndexConfig::default().with_dimension(2)).unwrap();
//!
//! let ids = index
//!     .insert_batch(vec![(NewClause::new("Payment is due in 30 days."), vec![1.0, 0.0])])
//!     .unwrap();
//! assert_eq!(ids, vec![1]);
//!
//! let hits = index.search(&[1.0, 0.0], 5).unwrap();
//! assert_eq!(hits[0].id, 1);
//! store.close().unwrap();
//! ```

mod backend;
pub mod ivf;
mod query;

use std::sync::{Arc, RwLock};

use bincode::config::standard;
use bincode::error::{DecodeError, EncodeError};
use bincode::serde::{decode_from_slice, encode_to_vec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zstd::{decode_all, encode_all};

#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;
pub use backend::{BackendConfig, InMemoryBackend, IndexBackend, StoreHandle};
pub use ivf::IvfIndex;
pub use query::{cosine, SimilarityResult};

/// Bump whenever the on-disk [`ClauseRecord`] layout changes.
pub const INDEX_SCHEMA_VERSION: u16 = 1;

mod metadata_serde {
    use serde::de::Error as DeError;
    use serde::ser::Error as SerError;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub(super) fn serialize<S>(value: &Value, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes = serde_json::to_vec(value).map_err(SerError::custom)?;
        serializer.serialize_bytes(&bytes)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        serde_json::from_slice(&bytes).map_err(DeError::custom)
    }
}

/// A stored clause.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClauseRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// Monotonic, starting at 1.
    pub id: u64,
    pub text: String,
    pub document_id: Option<String>,
    pub clause_type: Option<String>,
    /// Free-form JSON (section, risk level, ...).
    #[serde(with = "metadata_serde")]
    pub metadata: serde_json::Value,
    pub embedding: Vec<f32>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

const fn default_schema_version() -> u16 {
    INDEX_SCHEMA_VERSION
}

/// A clause waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClause {
    pub text: String,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub clause_type: Option<String>,
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl NewClause {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            document_id: None,
            clause_type: None,
            metadata: empty_object(),
        }
    }

    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn with_clause_type(mut self, clause_type: impl Into<String>) -> Self {
        self.clause_type = Some(clause_type.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Compression codec for stored records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    None,
    #[default]
    Zstd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub codec: CompressionCodec,
    /// 1-22 for zstd.
    pub level: i32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(codec: CompressionCodec, level: i32) -> Self {
        Self { codec, level }
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(encode_all(data, self.level)?),
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, IndexError> {
        match self.codec {
            CompressionCodec::None => Ok(data.to_vec()),
            CompressionCodec::Zstd => Ok(decode_all(data)?),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
}

/// Search and storage knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Every stored and query vector must have this length.
    pub dimension: usize,
    pub metric: Metric,
    /// IVF partitions.
    pub lists: usize,
    /// Partitions scanned per query.
    pub probes: usize,
    /// Collections smaller than this are scanned exhaustively.
    pub min_vectors_for_ivf: usize,
    pub ivf_enabled: bool,
    pub kmeans_iterations: usize,
    pub compression: CompressionConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dimension: 1536,
            metric: Metric::Cosine,
            lists: 100,
            probes: 10,
            min_vectors_for_ivf: 1000,
            ivf_enabled: true,
            kmeans_iterations: 10,
            compression: CompressionConfig::default(),
        }
    }
}

impl IndexConfig {
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_lists(mut self, lists: usize) -> Self {
        self.lists = lists;
        self
    }

    pub fn with_probes(mut self, probes: usize) -> Self {
        self.probes = probes;
        self
    }

    pub fn with_min_vectors_for_ivf(mut self, min: usize) -> Self {
        self.min_vectors_for_ivf = min;
        self
    }

    pub fn with_ivf_enabled(mut self, enabled: bool) -> Self {
        self.ivf_enabled = enabled;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    pub fn should_use_ivf(&self, num_vectors: usize) -> bool {
        self.ivf_enabled && num_vectors >= self.min_vectors_for_ivf
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.dimension == 0 {
            return Err(IndexError::Validation("dimension must be greater than zero".into()));
        }
        if self.lists == 0 {
            return Err(IndexError::Validation("lists must be greater than zero".into()));
        }
        if self.probes == 0 || self.probes > self.lists {
            return Err(IndexError::Validation(format!(
                "probes must be between 1 and lists ({}), got {}",
                self.lists, self.probes
            )));
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("compression error: {0}")]
    Compression(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("vector dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl From<EncodeError> for IndexError {
    fn from(e: EncodeError) -> Self {
        IndexError::Encode(e.to_string())
    }
}

impl From<DecodeError> for IndexError {
    fn from(e: DecodeError) -> Self {
        IndexError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        IndexError::Compression(e.to_string())
    }
}

impl IndexError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    /// Caller mistakes, as opposed to storage failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            IndexError::Validation(_) | IndexError::DimensionMismatch { .. }
        )
    }
}

/// Collection size summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub clause_count: usize,
    /// Distinct non-null document ids.
    pub document_count: usize,
}

#[derive(Default)]
struct IndexState {
    /// Sorted by id.
    records: Vec<ClauseRecord>,
    ivf: Option<IvfIndex>,
    next_id: u64,
}

/// In-memory view over the persisted clause collection.
pub struct ClauseIndex {
    backend: Arc<dyn IndexBackend>,
    cfg: IndexConfig,
    state: RwLock<IndexState>,
}

impl ClauseIndex {
    /// Load every stored record from `store` and build the search structures.
    pub fn open(store: &StoreHandle, cfg: IndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;
        let backend = store.backend();

        let mut records = Vec::new();
        backend.scan(&mut |data: &[u8]| {
            records.push(decode_record(&cfg.compression, data)?);
            Ok(())
        })?;
        records.sort_by_key(|r| r.id);
        if let Some(bad) = records.iter().find(|r| r.embedding.len() != cfg.dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: cfg.dimension,
                got: bad.embedding.len(),
            });
        }

        let next_id = records.last().map_or(1, |r| r.id + 1);
        let mut state = IndexState {
            records,
            ivf: None,
            next_id,
        };
        retrain_if_needed(&cfg, &mut state);
        tracing::info!(clauses = state.records.len(), next_id, "clause index loaded");

        Ok(Self {
            backend,
            cfg,
            state: RwLock::new(state),
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.cfg
    }

    /// Persist a batch and return the assigned ids, in input order.
    ///
    /// The batch is rejected as a whole if any text is blank or any vector has
    /// the wrong length. Nothing becomes visible to [`search`](Self::search)
    /// unless the backend write succeeds.
    pub fn insert_batch(&self, items: Vec<(NewClause, Vec<f32>)>) -> Result<Vec<u64>, IndexError> {
        for (position, (clause, embedding)) in items.iter().enumerate() {
            if clause.text.trim().is_empty() {
                return Err(IndexError::Validation(format!(
                    "clause {position} has empty text"
                )));
            }
            if embedding.len() != self.cfg.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.cfg.dimension,
                    got: embedding.len(),
                });
            }
        }
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut state = self.state.write().map_err(poisoned)?;
        let now = Utc::now();
        let first_id = state.next_id;
        let records: Vec<ClauseRecord> = items
            .into_iter()
            .zip(first_id..)
            .map(|((clause, embedding), id)| ClauseRecord {
                schema_version: INDEX_SCHEMA_VERSION,
                id,
                text: clause.text,
                document_id: clause.document_id,
                clause_type: clause.clause_type,
                metadata: clause.metadata,
                embedding,
                created_at: now,
            })
            .collect();

        let entries = records
            .iter()
            .map(|r| Ok((record_key(r.id), encode_record(&self.cfg.compression, r)?)))
            .collect::<Result<Vec<_>, IndexError>>()?;
        self.backend.batch_put(entries)?;

        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        state.next_id = first_id + ids.len() as u64;
        for record in records {
            let position = state.records.len();
            if let Some(ivf) = state.ivf.as_mut() {
                ivf.assign(position, &record.embedding);
            }
            state.records.push(record);
        }
        retrain_if_needed(&self.cfg, &mut state);

        tracing::debug!(inserted = ids.len(), first_id, "clause batch committed");
        Ok(ids)
    }

    /// Top-`k` clauses by cosine similarity to `query`, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SimilarityResult>, IndexError> {
        if k == 0 {
            return Err(IndexError::Validation("k must be at least 1".into()));
        }
        if query.len() != self.cfg.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.cfg.dimension,
                got: query.len(),
            });
        }

        let state = self.state.read().map_err(poisoned)?;
        let positions: Vec<usize> = match &state.ivf {
            Some(ivf) => ivf.candidates(query, self.cfg.probes),
            None => (0..state.records.len()).collect(),
        };
        let ranked = query::rank(&state.records, &positions, query, k);
        tracing::debug!(
            candidates = positions.len(),
            returned = ranked.len(),
            ivf = state.ivf.is_some(),
            "clause search"
        );
        Ok(ranked
            .into_iter()
            .map(|(pos, sim)| SimilarityResult::from_record(&state.records[pos], sim))
            .collect())
    }

    pub fn get(&self, id: u64) -> Result<Option<ClauseRecord>, IndexError> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|pos| state.records[pos].clone()))
    }

    pub fn stats(&self) -> Result<IndexStats, IndexError> {
        let state = self.state.read().map_err(poisoned)?;
        let documents: hashbrown::HashSet<&str> = state
            .records
            .iter()
            .filter_map(|r| r.document_id.as_deref())
            .collect();
        Ok(IndexStats {
            clause_count: state.records.len(),
            document_count: documents.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether searches currently go through IVF partitions.
    pub fn uses_ivf(&self) -> bool {
        self.state.read().map(|s| s.ivf.is_some()).unwrap_or(false)
    }

    pub fn flush(&self) -> Result<(), IndexError> {
        self.backend.flush()
    }
}

fn poisoned<T>(_: T) -> IndexError {
    IndexError::backend("poisoned index lock")
}

/// Zero-padded so lexicographic key order matches numeric id order.
pub fn record_key(id: u64) -> String {
    format!("{id:020}")
}

/// Train IVF once the collection crosses the threshold, and again each time
/// it doubles past the last training size.
fn retrain_if_needed(cfg: &IndexConfig, state: &mut IndexState) {
    let n = state.records.len();
    if !cfg.should_use_ivf(n) {
        state.ivf = None;
        return;
    }
    let stale = state.ivf.as_ref().map_or(true, |ivf| n >= ivf.trained_on() * 2);
    if stale {
        let vectors: Vec<&[f32]> = state.records.iter().map(|r| r.embedding.as_slice()).collect();
        state.ivf = Some(IvfIndex::train(&vectors, cfg.lists, cfg.kmeans_iterations));
    }
}

fn encode_record(compression: &CompressionConfig, rec: &ClauseRecord) -> Result<Vec<u8>, IndexError> {
    let encoded = encode_to_vec(rec, standard())?;
    compression.compress(&encoded)
}

fn decode_record(compression: &CompressionConfig, data: &[u8]) -> Result<ClauseRecord, IndexError> {
    let decompressed = compression.decompress(data)?;
    let (record, _) = decode_from_slice(&decompressed, standard())?;
    Ok(record)
}
