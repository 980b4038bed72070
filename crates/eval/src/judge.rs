use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::HashSet;
use serde::Serialize;
use telemetry::{instrument, Operation, SharedMetrics};

use crate::EvalError;

/// One answered golden-set item, as handed to a [`Judge`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSample {
    pub question: String,
    pub contexts: Vec<String>,
    pub answer: String,
    pub ground_truth: String,
}

/// Aggregate scores over a whole sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JudgeScores {
    pub faithfulness: f64,
    pub answer_relevancy: f64,
}

impl JudgeScores {
    pub const ZERO: JudgeScores = JudgeScores {
        faithfulness: 0.0,
        answer_relevancy: 0.0,
    };

    /// Force both scores into `[0, 1]`; NaN becomes 0.
    pub fn clamped(self) -> Self {
        Self {
            faithfulness: unit(self.faithfulness),
            answer_relevancy: unit(self.answer_relevancy),
        }
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Scores answered samples for faithfulness and answer relevancy.
///
/// Samples arrive in golden-set order with failed items already removed.
/// The slice is never empty.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(&self, samples: &[EvaluationSample]) -> Result<JudgeScores, EvalError>;

    fn name(&self) -> &str;
}

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "any", "are", "as", "at", "be", "by", "can", "case", "do", "does", "for",
    "from", "has", "have", "how", "i", "if", "in", "is", "it", "its", "my", "of", "on", "or",
    "shall", "that", "the", "their", "there", "this", "to", "was", "what", "when", "which",
    "who", "will", "with",
];

fn content_tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(|token| !STOPWORDS.contains(&token.as_str()))
        .collect()
}

/// Share of `needles` present in `haystack`; zero when there are no needles.
fn coverage(needles: &HashSet<String>, haystack: &HashSet<String>) -> f64 {
    if needles.is_empty() {
        return 0.0;
    }
    let hits = needles.iter().filter(|t| haystack.contains(*t)).count();
    hits as f64 / needles.len() as f64
}

/// Offline lexical judge.
///
/// Faithfulness of a sample is the share of the answer's content words that
/// occur in its contexts; relevancy is the share of the question's content
/// words that occur in the answer. Both are averaged over the sample set.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlapJudge;

impl OverlapJudge {
    pub fn score_sample(sample: &EvaluationSample) -> JudgeScores {
        let answer = content_tokens(&sample.answer);
        let context = content_tokens(&sample.contexts.join(" "));
        let question = content_tokens(&sample.question);
        JudgeScores {
            faithfulness: coverage(&answer, &context),
            answer_relevancy: coverage(&question, &answer),
        }
    }
}

#[async_trait]
impl Judge for OverlapJudge {
    async fn judge(&self, samples: &[EvaluationSample]) -> Result<JudgeScores, EvalError> {
        if samples.is_empty() {
            return Ok(JudgeScores::ZERO);
        }
        let (faithfulness, relevancy) = samples
            .iter()
            .map(Self::score_sample)
            .fold((0.0, 0.0), |(f, r), s| {
                (f + s.faithfulness, r + s.answer_relevancy)
            });
        let n = samples.len() as f64;
        Ok(JudgeScores {
            faithfulness: faithfulness / n,
            answer_relevancy: relevancy / n,
        })
    }

    fn name(&self) -> &str {
        "overlap"
    }
}

/// Reports every judge call and the resulting scores to `metrics`.
pub struct InstrumentedJudge {
    inner: Arc<dyn Judge>,
    metrics: SharedMetrics,
}

impl InstrumentedJudge {
    pub fn new(inner: Arc<dyn Judge>, metrics: SharedMetrics) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl Judge for InstrumentedJudge {
    async fn judge(&self, samples: &[EvaluationSample]) -> Result<JudgeScores, EvalError> {
        let count = samples.len();
        let scores = instrument(
            self.metrics.as_ref(),
            Operation::Judge,
            |_: &JudgeScores| count,
            self.inner.judge(samples),
        )
        .await?;
        self.metrics.record_score("faithfulness", scores.faithfulness);
        self.metrics
            .record_score("answer_relevancy", scores.answer_relevancy);
        Ok(scores)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemetry::{RecordingMetrics, Status};

    fn sample(question: &str, context: &str, answer: &str) -> EvaluationSample {
        EvaluationSample {
            question: question.into(),
            contexts: vec![context.into()],
            answer: answer.into(),
            ground_truth: String::new(),
        }
    }

    #[test]
    fn verbatim_context_answer_is_fully_faithful() {
        let clause = "Either party may terminate this agreement with 30 days written notice.";
        let scores =
            OverlapJudge::score_sample(&sample("How can I terminate the agreement?", clause, clause));
        assert_eq!(scores.faithfulness, 1.0);
        // terminate + agreement both appear in the answer.
        assert_eq!(scores.answer_relevancy, 1.0);
    }

    #[test]
    fn unsupported_answer_scores_low() {
        let scores = OverlapJudge::score_sample(&sample(
            "What are the payment terms?",
            "Payment terms are Net 30 days from invoice date.",
            "Bananas grow quickly in tropical climates.",
        ));
        assert_eq!(scores.faithfulness, 0.0);
        assert_eq!(scores.answer_relevancy, 0.0);
    }

    #[test]
    fn clamping_bounds_scores() {
        let scores = JudgeScores {
            faithfulness: 1.7,
            answer_relevancy: f64::NAN,
        }
        .clamped();
        assert_eq!(scores.faithfulness, 1.0);
        assert_eq!(scores.answer_relevancy, 0.0);
    }

    #[tokio::test]
    async fn averages_across_samples() {
        let clause = "Payment terms are Net 30 days from invoice date.";
        let samples = vec![
            sample("What are the payment terms?", clause, clause),
            sample("What are the payment terms?", clause, "Unrelated words entirely."),
        ];
        let scores = OverlapJudge.judge(&samples).await.unwrap();
        assert!((scores.faithfulness - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn instrumented_judge_records_call_and_scores() {
        let recorder = Arc::new(RecordingMetrics::new());
        let judge = InstrumentedJudge::new(Arc::new(OverlapJudge), recorder.clone());
        let clause = "Payment terms are Net 30 days from invoice date.";
        judge
            .judge(&[sample("What are the payment terms?", clause, clause)])
            .await
            .unwrap();

        let events = recorder.events_for(Operation::Judge);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].items, 1);
        assert_eq!(events[0].status, Status::Success);
        let names: Vec<_> = recorder.scores().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["faithfulness", "answer_relevancy"]);
        assert_eq!(judge.name(), "overlap");
    }
}
