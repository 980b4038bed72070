//! The three agent-facing tools and their JSON contracts.
//!
//! Each tool returns a typed report. Observers read counts from the report
//! fields; `to_json` produces the string handed back to the reasoning loop.

use std::sync::Arc;

use clauses::{ClauseCandidate, RiskAssessment, RiskLevel, Segmentation};
use retrieval::{RetrievalError, SimilarityResult, SimilarityStore};
use serde::{Deserialize, Serialize, Serializer};
use telemetry::{Operation, OperationMetrics, OperationSpan, SharedMetrics};

use crate::Error;

/// Characters of clause text kept in a risk report preview.
pub const PREVIEW_CHARS: usize = 150;
/// Characters of clause text kept per search result.
pub const RESULT_CHARS: usize = 200;
pub const DEFAULT_SEARCH_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Results returned by `search_legal_db`.
    pub search_k: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            search_k: DEFAULT_SEARCH_K,
        }
    }
}

impl ToolsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.search_k == 0 {
            return Err("tools.search_k must be at least 1".into());
        }
        Ok(())
    }
}

/// Name and one-line usage of a tool, as advertised to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
}

pub const TOOL_SPECS: [ToolSpec; 3] = [
    ToolSpec {
        name: "extract_clauses",
        description: "Extract and identify legal clauses from a document. Input: document text.",
    },
    ToolSpec {
        name: "search_legal_db",
        description: "Search the legal clause database for similar clauses. Input: search query. \
                      Returns relevant clauses with similarity scores.",
    },
    ToolSpec {
        name: "score_risk",
        description: "Score the risk level of a legal clause. Input: clause text. \
                      Returns risk level, score and recommendation.",
    },
];

/// `text` cut to `max` characters, with `...` appended when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

/// Rounds the exact decimal expansion of `value`, ties to even.
fn round_to(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}

fn one_decimal<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 1))
}

fn three_decimals<S: Serializer>(value: &f32, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(f64::from(*value), 3))
}

/// Output of `extract_clauses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseExtraction {
    /// Every candidate found, including those beyond the returned list.
    pub num_clauses: usize,
    pub clauses: Vec<ClauseCandidate>,
    pub total_length: usize,
}

impl From<Segmentation> for ClauseExtraction {
    fn from(seg: Segmentation) -> Self {
        Self {
            num_clauses: seg.num_clauses,
            clauses: seg.clauses,
            total_length: seg.total_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub clause: String,
    #[serde(rename = "type")]
    pub clause_type: Option<String>,
    #[serde(serialize_with = "three_decimals")]
    pub similarity: f32,
    pub document_id: Option<String>,
}

impl From<SimilarityResult> for SearchHit {
    fn from(hit: SimilarityResult) -> Self {
        Self {
            clause: truncate_chars(&hit.text, RESULT_CHARS),
            clause_type: hit.clause_type,
            similarity: hit.similarity,
            document_id: hit.document_id,
        }
    }
}

/// Output of `search_legal_db`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub query: String,
    pub num_results: usize,
    pub results: Vec<SearchHit>,
}

/// Output of `score_risk`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub risk_level: RiskLevel,
    #[serde(serialize_with = "one_decimal")]
    pub risk_score: f64,
    pub high_risk_indicators: usize,
    pub medium_risk_indicators: usize,
    pub low_risk_indicators: usize,
    #[serde(serialize_with = "one_decimal")]
    pub additional_risk_score: f64,
    pub clause_preview: String,
    pub recommendation: String,
}

impl RiskReport {
    pub fn new(clause: &str, assessment: RiskAssessment) -> Self {
        Self {
            risk_level: assessment.risk_level,
            risk_score: assessment.risk_score,
            high_risk_indicators: assessment.high_count,
            medium_risk_indicators: assessment.medium_count,
            low_risk_indicators: assessment.low_count,
            additional_risk_score: assessment.additional_score,
            clause_preview: truncate_chars(clause, PREVIEW_CHARS),
            recommendation: assessment.recommendation,
        }
    }
}

macro_rules! impl_to_json {
    ($($ty:ty),*) => {$(
        impl $ty {
            /// Pretty-printed JSON, as returned to the agent.
            pub fn to_json(&self) -> serde_json::Result<String> {
                serde_json::to_string_pretty(self)
            }
        }
    )*};
}

impl_to_json!(ClauseExtraction, SearchReport, RiskReport);

/// `extract_clauses` without a store; reports to `metrics`.
pub fn extract_clauses(document: &str, metrics: &dyn OperationMetrics) -> ClauseExtraction {
    let span = OperationSpan::start(metrics, Operation::ExtractClauses);
    let extraction = ClauseExtraction::from(clauses::segment(document));
    span.success(extraction.num_clauses);
    tracing::debug!(
        clauses = extraction.num_clauses,
        total_length = extraction.total_length,
        "extracted clauses"
    );
    extraction
}

/// `score_risk` without a store; reports the tier to `metrics`.
pub fn score_risk(clause: &str, metrics: &dyn OperationMetrics) -> RiskReport {
    let span = OperationSpan::start(metrics, Operation::ScoreRisk);
    let assessment = clauses::score_risk(clause);
    span.success(1);
    metrics.record_label(Operation::ScoreRisk, assessment.risk_level.as_str());
    RiskReport::new(clause, assessment)
}

/// Tool implementations over one similarity store.
pub struct LegalTools {
    store: Arc<SimilarityStore>,
    metrics: SharedMetrics,
    config: ToolsConfig,
}

impl LegalTools {
    pub fn new(store: Arc<SimilarityStore>, metrics: SharedMetrics, config: ToolsConfig) -> Self {
        Self {
            store,
            metrics,
            config,
        }
    }

    pub fn store(&self) -> &Arc<SimilarityStore> {
        &self.store
    }

    pub fn extract_clauses(&self, document: &str) -> ClauseExtraction {
        extract_clauses(document, self.metrics.as_ref())
    }

    pub async fn search_legal_db(&self, query: &str) -> Result<SearchReport, RetrievalError> {
        let hits = self.store.search(query, self.config.search_k).await?;
        let results: Vec<SearchHit> = hits.into_iter().map(SearchHit::from).collect();
        Ok(SearchReport {
            query: query.to_string(),
            num_results: results.len(),
            results,
        })
    }

    pub fn score_risk(&self, clause: &str) -> RiskReport {
        score_risk(clause, self.metrics.as_ref())
    }

    /// Run the tool called `name` and return its JSON output.
    pub async fn call(&self, name: &str, input: &str) -> Result<String, Error> {
        let json = match name {
            "extract_clauses" => self.extract_clauses(input).to_json()?,
            "search_legal_db" => self.search_legal_db(input).await?.to_json()?,
            "score_risk" => self.score_risk(input).to_json()?,
            other => return Err(Error::UnknownTool(other.to_string())),
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_chars("abcdefghijk", 10), "abcdefghij...");
        // Multi-byte characters are never split.
        let text = "§".repeat(12);
        assert_eq!(truncate_chars(&text, 10), format!("{}...", "§".repeat(10)));
    }

    #[test]
    fn rounding_matches_contract_precision() {
        assert_eq!(round_to(8.25 + 0.0001, 1), 8.3);
        assert_eq!(round_to(0.98765, 3), 0.988);
    }

    #[test]
    fn exact_ties_round_to_even() {
        assert_eq!(round_to(7.25, 1), 7.2);
        assert_eq!(round_to(6.25, 1), 6.2);
        assert_eq!(round_to(8.75, 1), 8.8);
        // 6.45 is stored slightly above the tie.
        assert_eq!(round_to(6.45, 1), 6.5);
        assert_eq!(round_to(10.0, 1), 10.0);
    }

    #[test]
    fn risk_report_json_shape() {
        let clause = "Supplier accepts unlimited liability and no warranty applies.";
        let report = RiskReport::new(clause, clauses::score_risk(clause));
        let value: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();

        for key in [
            "risk_level",
            "risk_score",
            "high_risk_indicators",
            "medium_risk_indicators",
            "low_risk_indicators",
            "additional_risk_score",
            "clause_preview",
            "recommendation",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["risk_level"], "HIGH");
        assert_eq!(value["clause_preview"], clause);
    }

    #[test]
    fn search_hit_truncates_and_rounds() {
        let hit = SearchHit::from(SimilarityResult {
            id: 1,
            text: "x".repeat(250),
            document_id: Some("DOC001".into()),
            clause_type: None,
            metadata: serde_json::Value::Null,
            similarity: 0.987_654,
        });
        assert_eq!(hit.clause.chars().count(), RESULT_CHARS + 3);
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["similarity"], 0.988);
        assert!(json["type"].is_null());
    }
}
