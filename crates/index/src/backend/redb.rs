//! Persistent backend on top of redb.
//!
//! Every write is its own committed transaction, so a batch is either fully
//! visible after a restart or not at all.
//!
//! ```yaml
//! store:
//!   backend: redb
//!   path: ./data/clauses.redb
//! ```

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::{IndexBackend, IndexError};

const CLAUSE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("clauses");

pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let db = Database::create(path).map_err(IndexError::backend)?;

        let write_txn = db.begin_write().map_err(IndexError::backend)?;
        {
            let _table = write_txn
                .open_table(CLAUSE_TABLE)
                .map_err(IndexError::backend)?;
        }
        write_txn.commit().map_err(IndexError::backend)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl IndexBackend for RedbBackend {
    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), IndexError> {
        let write_txn = self.db.begin_write().map_err(IndexError::backend)?;
        {
            let mut table = write_txn
                .open_table(CLAUSE_TABLE)
                .map_err(IndexError::backend)?;
            for (key, value) in &entries {
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(IndexError::backend)?;
            }
        }
        write_txn.commit().map_err(IndexError::backend)?;
        Ok(())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), IndexError>,
    ) -> Result<(), IndexError> {
        let read_txn = self.db.begin_read().map_err(IndexError::backend)?;
        let table = read_txn
            .open_table(CLAUSE_TABLE)
            .map_err(IndexError::backend)?;
        for item in table.iter().map_err(IndexError::backend)? {
            let (_, value) = item.map_err(IndexError::backend)?;
            visitor(value.value())?;
        }
        Ok(())
    }

    // Commits are durable on return; nothing is buffered.
    fn flush(&self) -> Result<(), IndexError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn values(backend: &RedbBackend) -> Vec<Vec<u8>> {
        let mut seen = Vec::new();
        backend
            .scan(&mut |v| {
                seen.push(v.to_vec());
                Ok(())
            })
            .unwrap();
        seen
    }

    #[test]
    fn batch_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clauses.redb");
        {
            let backend = RedbBackend::open(&path).unwrap();
            backend
                .batch_put(vec![
                    ("00000000000000000002".into(), b"two".to_vec()),
                    ("00000000000000000001".into(), b"one".to_vec()),
                ])
                .unwrap();
        }
        let backend = RedbBackend::open(&path).unwrap();
        assert_eq!(values(&backend), vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn later_batch_overwrites_same_key() {
        let dir = tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("o.redb")).unwrap();
        backend.batch_put(vec![("k".into(), b"old".to_vec())]).unwrap();
        backend.batch_put(vec![("k".into(), b"new".to_vec())]).unwrap();
        assert_eq!(values(&backend), vec![b"new".to_vec()]);
    }

    #[test]
    fn scan_error_stops_iteration() {
        let dir = tempdir().unwrap();
        let backend = RedbBackend::open(dir.path().join("s.redb")).unwrap();
        backend
            .batch_put(vec![("a".into(), b"1".to_vec()), ("b".into(), b"2".to_vec())])
            .unwrap();
        let mut calls = 0;
        let out = backend.scan(&mut |_| {
            calls += 1;
            Err(IndexError::backend("stop"))
        });
        assert!(out.is_err());
        assert_eq!(calls, 1);
    }
}
