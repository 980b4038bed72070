//! # Clause analysis
//!
//! Pure, synchronous analysis of legal text. Nothing in this crate performs
//! I/O or holds shared mutable state, so every function is safe to call from
//! any number of threads.
//!
//! - [`segment`] splits a document into clause candidates, line by line.
//! - [`classify`] tags a clause with one of seven [`ClauseType`]s using
//!   prioritized keyword groups.
//! - [`score_risk`] computes a [`RiskAssessment`]: tier, clamped score and
//!   review recommendation.
//!
//! All three are driven by the ordered tables in [`lexicon`]. The `*_with_*`
//! variants accept a custom [`Lexicon`] or [`SegmentConfig`].
//!
//! ```
//! use clauses::{classify, score_risk, segment, ClauseType, RiskLevel};
//!
//! let doc = "LIABILITY CLAUSE: Supplier accepts unlimited liability.\n\n\
//!            PAYMENT CLAUSE: Fees are due within 30 days.";
//! let seg = segment(doc);
//! assert_eq!(seg.num_clauses, 2);
//! assert_eq!(seg.clauses[0].clause_type, ClauseType::Liability);
//!
//! assert_eq!(classify("Payment is due on receipt"), ClauseType::Financial);
//! assert_eq!(score_risk("good faith and best efforts").risk_level, RiskLevel::Low);
//! ```

mod classify;
pub mod lexicon;
mod risk;
mod segment;
mod types;

pub use classify::{classify, classify_with_lexicon};
pub use lexicon::Lexicon;
pub use risk::{
    recommendation, score_risk, score_risk_with_lexicon, tier_and_score, MatchedTerms,
    RiskAssessment, RECOMMEND_HIGH, RECOMMEND_LOW, RECOMMEND_MEDIUM,
};
pub use segment::{
    segment, segment_with_config, ClauseCandidate, SegmentConfig, Segmentation, MAX_CLAUSES,
    MIN_CLAUSE_CHARS,
};
pub use types::{ClauseType, ParseClauseTypeError, RiskLevel};
