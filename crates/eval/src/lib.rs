//! Golden-set evaluation for clause question answering.
//!
//! [`evaluate`] drives every [`GoldenSetItem`] through an [`AnswerFn`] in
//! order, drops the items whose answer failed, and hands the survivors to a
//! [`Judge`] as one batch. [`gate`] turns the aggregate into a PASS/FAIL
//! verdict on faithfulness alone.
//!
//! ```
//! use eval::{evaluate, gate, sample_golden_set, OverlapJudge};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let golden = sample_golden_set();
//! let answer = |question: String| async move {
//!     Ok::<_, std::convert::Infallible>(format!("No clause covers: {question}"))
//! };
//! let result = evaluate(&golden, &answer, &OverlapJudge).await.unwrap();
//! assert_eq!(result.sample_count, 5);
//! assert!(!gate(&result, 0.85));
//! # });
//! ```
mod answer;
mod error;
mod golden;
mod harness;
mod judge;

pub use answer::{AnswerFn, RetrievalAnswerer};
pub use error::EvalError;
pub use golden::{
    load_golden_set, parse_golden_set, sample_golden_set, write_golden_set, GoldenSetItem,
};
pub use harness::{
    evaluate, gate, EvalConfig, EvaluationReport, EvaluationResult, DEFAULT_THRESHOLD,
};
pub use judge::{EvaluationSample, InstrumentedJudge, Judge, JudgeScores, OverlapJudge};
