use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::IndexError;

/// Key-value storage underneath the clause index.
pub trait IndexBackend: Send + Sync {
    /// Write every entry or none of them.
    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), IndexError>;
    /// Visit every stored value in key order.
    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), IndexError>,
    ) -> Result<(), IndexError>;
    fn flush(&self) -> Result<(), IndexError> {
        Ok(())
    }
}

/// Which backend a [`StoreHandle`] opens.
///
/// ```
/// use index::BackendConfig;
///
/// let memory = BackendConfig::in_memory();
/// let file = BackendConfig::redb("/var/lib/clausefp/clauses.redb");
/// assert_ne!(memory, file);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Volatile; contents vanish with the handle.
    #[default]
    InMemory,
    /// Embedded ACID file store at `path`.
    Redb { path: String },
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    pub fn build(&self) -> Result<Arc<dyn IndexBackend>, IndexError> {
        match self {
            BackendConfig::InMemory => Ok(Arc::new(InMemoryBackend::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Arc::new(RedbBackend::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(IndexError::backend("redb backend disabled at compile time"))
                }
            }
        }
    }
}

/// An opened storage connection.
///
/// Opened once per process and passed to every component that persists
/// clauses. [`close`](Self::close) flushes pending writes and releases this
/// handle's reference to the backend.
pub struct StoreHandle {
    backend: Arc<dyn IndexBackend>,
    config: BackendConfig,
}

impl StoreHandle {
    pub fn open(config: &BackendConfig) -> Result<Self, IndexError> {
        let backend = config.build()?;
        tracing::info!(?config, "clause store opened");
        Ok(Self {
            backend,
            config: config.clone(),
        })
    }

    /// Wrap an already constructed backend.
    pub fn with_backend(backend: Arc<dyn IndexBackend>) -> Self {
        Self {
            backend,
            config: BackendConfig::InMemory,
        }
    }

    pub fn backend(&self) -> Arc<dyn IndexBackend> {
        Arc::clone(&self.backend)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn close(self) -> Result<(), IndexError> {
        self.backend.flush()?;
        tracing::info!(config = ?self.config, "clause store closed");
        Ok(())
    }
}

/// Ordered in-memory map behind a single lock.
#[derive(Default)]
pub struct InMemoryBackend {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> IndexError {
    IndexError::backend("poisoned lock")
}

impl IndexBackend for InMemoryBackend {
    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), IndexError> {
        // One write lock for the whole batch.
        let mut guard = self.records.write().map_err(poisoned)?;
        guard.extend(entries);
        Ok(())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), IndexError>,
    ) -> Result<(), IndexError> {
        let guard = self.records.read().map_err(poisoned)?;
        for value in guard.values() {
            visitor(value)?;
        }
        Ok(())
    }
}

#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::RedbBackend;
