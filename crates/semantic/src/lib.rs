//! Embedding providers for clause retrieval.
//!
//! [`EmbeddingProvider`] is the seam between the similarity store and
//! whatever turns text into vectors. Two implementations ship:
//!
//! - [`StubEmbedder`] (`mode = "fast"`): deterministic, offline, feature-hashed.
//! - [`ApiEmbedder`] (`mode = "api"`): OpenAI-compatible HTTP endpoint with
//!   retry and exponential backoff.
//!
//! Every provider guarantees one vector per input, each of exactly
//! [`SemanticConfig::dimension`] values; anything else is a [`SemanticError`].
//!
//! ```
//! use semantic::{build_provider, SemanticConfig};
//!
//! let provider = build_provider(&SemanticConfig::default().with_dimension(32)).unwrap();
//! assert_eq!(provider.dimension(), 32);
//! ```
mod api;
mod config;
mod error;
mod provider;
pub mod retry;
mod stub;
pub mod vector;

pub use api::ApiEmbedder;
pub use config::{ApiProvider, EmbeddingMode, SemanticConfig};
pub use error::SemanticError;
pub use provider::{
    build_instrumented_provider, build_provider, EmbeddingProvider, InstrumentedEmbedder,
    SharedProvider,
};
pub use retry::RetryConfig;
pub use stub::StubEmbedder;
