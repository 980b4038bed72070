//! Persistence of the clause store across handles.
#![cfg(feature = "redb")]

use std::sync::Arc;

use clausefp::{
    BackendConfig, IndexConfig, NewClause, SimilarityStore, StoreHandle, sample_clauses,
    seed_sample_data,
};
use semantic::StubEmbedder;

const DIM: usize = 64;

fn open(path: &std::path::Path) -> (StoreHandle, SimilarityStore) {
    let handle = StoreHandle::open(&BackendConfig::redb(path.to_string_lossy())).unwrap();
    let store = SimilarityStore::open(
        &handle,
        IndexConfig::default().with_dimension(DIM),
        Arc::new(StubEmbedder::new(DIM)),
        telemetry::noop(),
    )
    .unwrap();
    (handle, store)
}

#[tokio::test]
async fn reopened_store_keeps_clauses_and_id_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clauses.redb");

    {
        let (handle, store) = open(&path);
        let ids = seed_sample_data(&store).await.unwrap();
        assert_eq!(ids, (1..=8).collect::<Vec<u64>>());
        drop(store);
        handle.close().unwrap();
    }

    let (handle, store) = open(&path);
    let stats = store.stats().unwrap();
    assert_eq!(stats.clause_count, 8);
    assert_eq!(stats.document_count, 4);

    let query = &sample_clauses()[4].text;
    let hits = store.search(query, 3).await.unwrap();
    assert_eq!(&hits[0].text, query);
    assert_eq!(hits[0].document_id.as_deref(), Some("DOC003"));
    assert_eq!(hits[0].metadata["section"], "9.1");
    assert_eq!(hits[0].metadata["risk_level"], "high");

    let ids = store
        .add(vec![NewClause::new("A ninth clause added after reopening the store.")])
        .await
        .unwrap();
    assert_eq!(ids, vec![9]);
    drop(store);
    handle.close().unwrap();
}

#[tokio::test]
async fn rejected_batch_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clauses.redb");

    {
        let (handle, store) = open(&path);
        let err = store
            .add(vec![
                NewClause::new("A perfectly valid clause about payment terms."),
                NewClause::new(""),
            ])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        drop(store);
        handle.close().unwrap();
    }

    let (_handle, store) = open(&path);
    assert_eq!(store.stats().unwrap().clause_count, 0);
}

#[tokio::test]
async fn dimension_change_is_refused_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clauses.redb");
    {
        let (handle, store) = open(&path);
        seed_sample_data(&store).await.unwrap();
        drop(store);
        handle.close().unwrap();
    }

    let handle = StoreHandle::open(&BackendConfig::redb(path.to_string_lossy())).unwrap();
    let result = SimilarityStore::open(
        &handle,
        IndexConfig::default().with_dimension(DIM * 2),
        Arc::new(StubEmbedder::new(DIM * 2)),
        telemetry::noop(),
    );
    assert!(result.is_err());
}
