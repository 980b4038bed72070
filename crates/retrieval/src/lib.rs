//! # Clause retrieval
//!
//! [`SimilarityStore`] is the clause collection as callers see it: plain text
//! in, ranked clauses out. It owns nothing global; the storage handle, the
//! embedding provider and the metrics observer are all passed in.
//!
//! ```no_run
//! use std::sync::Arc;
//! use index::{BackendConfig, IndexConfig, NewClause, StoreHandle};
//! use retrieval::SimilarityStore;
//! use semantic::StubEmbedder;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = StoreHandle::open(&BackendConfig::in_memory())?;
//! let store = SimilarityStore::open(
//!     &handle,
//!     IndexConfig::default(),
//!     Arc::new(StubEmbedder::new(1536)),
//!     telemetry::noop(),
//! )?;
//!
//! store
//!     .add(vec![NewClause::new("Payment terms are Net 30 days from invoice date.")
//!         .with_document_id("DOC002")
//!         .with_clause_type("financial")])
//!     .await?;
//!
//! for hit in store.search("when is payment due?", 5).await? {
//!     println!("{:.3} {}", hit.similarity, hit.text);
//! }
//! drop(store);
//! handle.close()?;
//! # Ok(())
//! # }
//! ```
mod store;
mod types;

pub use index::{IndexStats, NewClause, SimilarityResult};
pub use store::SimilarityStore;
pub use types::RetrievalError;
