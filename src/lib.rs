//! Workspace umbrella crate for clausefp.
//!
//! Re-exports the pipeline stages (clause analysis, embeddings, the clause
//! index, retrieval and evaluation) and adds what sits on top of them: layered
//! configuration, the three agent tools with their JSON contracts, and the
//! bundled sample data.
//!
//! ```no_run
//! use std::sync::Arc;
//! use clausefp::{
//!     build_provider, seed_sample_data, AppConfig, LegalTools, SimilarityStore, StoreHandle,
//! };
//!
//! # async fn run() -> Result<(), clausefp::Error> {
//! let cfg = AppConfig::load(None)?;
//! let handle = StoreHandle::open(&cfg.store)?;
//! let provider = build_provider(&cfg.semantic)?;
//! let store = Arc::new(SimilarityStore::open(
//!     &handle,
//!     cfg.index.clone(),
//!     provider,
//!     telemetry::noop(),
//! )?);
//! seed_sample_data(&store).await?;
//!
//! let tools = LegalTools::new(store, telemetry::noop(), cfg.tools.clone());
//! println!("{}", tools.call("search_legal_db", "payment terms").await?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod seed;
pub mod tools;

pub use clauses::{
    ClauseCandidate, ClauseType, RiskAssessment, RiskLevel, Segmentation, classify, score_risk,
    segment,
};
pub use eval::{
    AnswerFn, EvalConfig, EvalError, EvaluationReport, EvaluationResult, GoldenSetItem,
    InstrumentedJudge, Judge, OverlapJudge, RetrievalAnswerer, evaluate, gate, load_golden_set,
    sample_golden_set, write_golden_set,
};
pub use index::{BackendConfig, IndexConfig, IndexError, StoreHandle};
pub use retrieval::{IndexStats, NewClause, RetrievalError, SimilarityResult, SimilarityStore};
pub use semantic::{
    EmbeddingProvider, SemanticConfig, SemanticError, SharedProvider, build_instrumented_provider,
    build_provider,
};

pub use crate::config::{AppConfig, ConfigLoadError, LogFormat};
pub use crate::seed::{sample_clauses, seed_sample_data};
pub use crate::tools::{
    ClauseExtraction, LegalTools, RiskReport, SearchHit, SearchReport, TOOL_SPECS, ToolsConfig,
};

use thiserror::Error;

/// Coarse classification of every failure the pipeline can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input rejected before any persistence.
    Validation,
    /// An embedding, answer or judge service failed.
    Provider,
    /// Startup configuration is missing or inconsistent. Fatal.
    Configuration,
    /// The clause store could not read or write.
    Storage,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("failed to encode tool output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Configuration,
            Error::Semantic(SemanticError::InvalidConfig(_)) => ErrorKind::Configuration,
            Error::Semantic(_) => ErrorKind::Provider,
            Error::Index(err) => index_kind(err),
            Error::Retrieval(err) => retrieval_kind(err),
            Error::Eval(err) => match err {
                EvalError::Io { .. } | EvalError::Format(_) | EvalError::InvalidGoldenSet(_) => {
                    ErrorKind::Configuration
                }
                EvalError::Answer(_) | EvalError::Judge(_) => ErrorKind::Provider,
                EvalError::Retrieval(err) => retrieval_kind(err),
            },
            Error::Json(_) | Error::UnknownTool(_) => ErrorKind::Validation,
        }
    }
}

fn index_kind(err: &IndexError) -> ErrorKind {
    if err.is_validation() {
        ErrorKind::Validation
    } else {
        ErrorKind::Storage
    }
}

fn retrieval_kind(err: &RetrievalError) -> ErrorKind {
    match err {
        RetrievalError::Validation(_) => ErrorKind::Validation,
        RetrievalError::Provider(_) => ErrorKind::Provider,
        RetrievalError::Storage(err) => index_kind(err),
    }
}
