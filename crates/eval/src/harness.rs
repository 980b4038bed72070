use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{AnswerFn, EvalError, EvaluationSample, GoldenSetItem, Judge, JudgeScores};

pub const DEFAULT_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvalConfig {
    /// Minimum faithfulness for a passing run.
    pub threshold: f64,
    pub golden_path: String,
    /// Clauses retrieved per question by the retrieval answerer.
    pub answer_k: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            golden_path: "golden_set.json".into(),
            answer_k: 1,
        }
    }
}

impl EvalConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!(
                "eval.threshold must be within [0, 1], got {}",
                self.threshold
            ));
        }
        if self.answer_k == 0 {
            return Err("eval.answer_k must be at least 1".into());
        }
        Ok(())
    }
}

/// Aggregate scores of one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub faithfulness: f64,
    pub answer_relevancy: f64,
    /// Items that were answered and judged.
    pub sample_count: usize,
    /// Items whose answer failed and were left out.
    pub skipped: usize,
}

/// Answer every item in order, then judge the survivors as one set.
///
/// A failing answer is logged and skipped. A failing judge fails the run.
pub async fn evaluate(
    golden: &[GoldenSetItem],
    answer_fn: &dyn AnswerFn,
    judge: &dyn Judge,
) -> Result<EvaluationResult, EvalError> {
    let total = golden.len();
    let mut samples = Vec::with_capacity(total);
    for (idx, item) in golden.iter().enumerate() {
        debug!(item = idx + 1, total, "answering golden item");
        match answer_fn.answer(&item.question).await {
            Ok(answer) => samples.push(EvaluationSample {
                question: item.question.clone(),
                contexts: item.context.clone(),
                answer,
                ground_truth: item.ground_truth.clone(),
            }),
            Err(err) => warn!(item = idx, error = %err, "skipping golden item"),
        }
    }

    let skipped = total - samples.len();
    let scores = if samples.is_empty() {
        JudgeScores::ZERO
    } else {
        judge.judge(&samples).await?.clamped()
    };
    info!(
        judge = judge.name(),
        samples = samples.len(),
        skipped,
        faithfulness = scores.faithfulness,
        answer_relevancy = scores.answer_relevancy,
        "evaluation finished"
    );
    Ok(EvaluationResult {
        faithfulness: scores.faithfulness,
        answer_relevancy: scores.answer_relevancy,
        sample_count: samples.len(),
        skipped,
    })
}

/// PASS iff faithfulness reaches the threshold. Relevancy never gates.
pub fn gate(result: &EvaluationResult, threshold: f64) -> bool {
    result.faithfulness >= threshold
}

const RULE: &str = "============================================================";

/// Human-readable run summary with the gate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub result: EvaluationResult,
    pub threshold: f64,
    pub passed: bool,
}

impl EvaluationReport {
    pub fn new(result: EvaluationResult, threshold: f64) -> Self {
        Self {
            result,
            threshold,
            passed: gate(&result, threshold),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.result;
        writeln!(f, "{RULE}")?;
        writeln!(f, "EVALUATION RESULTS")?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Faithfulness:     {:.4} (threshold: {})",
            r.faithfulness, self.threshold
        )?;
        writeln!(f, "Answer Relevancy: {:.4}", r.answer_relevancy)?;
        writeln!(f, "Samples:          {}", r.sample_count)?;
        if r.skipped > 0 {
            writeln!(f, "Skipped:          {}", r.skipped)?;
        }
        writeln!(f, "{RULE}")?;
        writeln!(f)?;
        if self.passed {
            write!(
                f,
                "PASS: Faithfulness {:.4} >= {}",
                r.faithfulness, self.threshold
            )
        } else {
            write!(
                f,
                "FAIL: Faithfulness {:.4} < {}",
                r.faithfulness, self.threshold
            )
        }
    }
}
