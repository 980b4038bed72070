//! Tool-level throughput: offline extraction and scoring, and store search
//! over a synthetic collection large enough to engage the IVF path.

use std::hint::black_box;
use std::sync::Arc;

use clausefp::tools::{extract_clauses, score_risk};
use clausefp::{BackendConfig, IndexConfig, NewClause, SimilarityStore, StoreHandle};
use criterion::{Criterion, criterion_group, criterion_main};
use semantic::StubEmbedder;
use telemetry::NoopMetrics;

const DIM: usize = 256;

fn contract(sections: usize) -> String {
    (0..sections)
        .map(|i| {
            format!(
                "Section {i}. LIMITATION OF LIABILITY\n\
                 The Supplier accepts unlimited liability for penalty payments\n\
                 and agrees to liquidated damages without notice.\n\n"
            )
        })
        .collect()
}

fn bench_tools(c: &mut Criterion) {
    let doc = contract(500);
    c.bench_function("extract_clauses_500_sections", |b| {
        b.iter(|| extract_clauses(black_box(&doc), &NoopMetrics))
    });

    let clause = "Licensee shall indemnify Licensor and waive all rights to an exclusive, \
                  perpetual and irrevocable license.";
    c.bench_function("score_risk_report", |b| {
        b.iter(|| score_risk(black_box(clause), &NoopMetrics))
    });
}

fn bench_search(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let handle = StoreHandle::open(&BackendConfig::in_memory()).expect("store");
    let cfg = IndexConfig::default()
        .with_dimension(DIM)
        .with_lists(32)
        .with_probes(4)
        .with_min_vectors_for_ivf(1000);
    let store = SimilarityStore::open(
        &handle,
        cfg,
        Arc::new(StubEmbedder::new(DIM)),
        telemetry::noop(),
    )
    .expect("similarity store");

    let clauses: Vec<NewClause> = (0..5000)
        .map(|i| {
            NewClause::new(format!(
                "Clause {i}: payment of fee {} within {} days, liability capped at {} units.",
                i % 97,
                i % 60,
                i % 13
            ))
            .with_document_id(format!("DOC{:03}", i % 200))
        })
        .collect();
    rt.block_on(store.add(clauses)).expect("seed");
    assert!(store.index().uses_ivf());

    c.bench_function("search_k5_5000_clauses", |b| {
        b.iter(|| rt.block_on(store.search(black_box("liability capped at 7 units"), 5)))
    });
}

criterion_group!(benches, bench_tools, bench_search);
criterion_main!(benches);
