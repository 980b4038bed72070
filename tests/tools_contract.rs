//! JSON contracts of the three agent tools.

use std::sync::Arc;

use clausefp::{
    BackendConfig, ErrorKind, IndexConfig, LegalTools, SimilarityStore, StoreHandle, ToolsConfig,
    seed_sample_data,
};
use semantic::StubEmbedder;
use serde_json::Value;
use telemetry::{Operation, RecordingMetrics};

const DIM: usize = 96;

async fn seeded_tools(metrics: Arc<RecordingMetrics>) -> LegalTools {
    let handle = StoreHandle::open(&BackendConfig::in_memory()).unwrap();
    let store = SimilarityStore::open(
        &handle,
        IndexConfig::default().with_dimension(DIM),
        Arc::new(StubEmbedder::new(DIM)),
        metrics.clone(),
    )
    .unwrap();
    seed_sample_data(&store).await.unwrap();
    LegalTools::new(Arc::new(store), metrics, ToolsConfig::default())
}

fn parse(json: &str) -> Value {
    serde_json::from_str(json).expect("tool output is valid JSON")
}

#[tokio::test]
async fn extract_clauses_contract() {
    let tools = seeded_tools(Arc::new(RecordingMetrics::new())).await;
    let document = "\
SECTION 1. PAYMENT
The Customer shall pay all fees within thirty days.

SECTION 2. LIABILITY
Neither party is liable for indirect damages.

ok";
    let value = parse(&tools.call("extract_clauses", document).await.unwrap());

    assert_eq!(value["num_clauses"], 2);
    let clauses = value["clauses"].as_array().unwrap();
    assert_eq!(clauses.len(), 2);
    for clause in clauses {
        assert!(clause["text"].as_str().unwrap().chars().count() > 20);
        assert!(clause["type"].is_string());
        assert!(clause["length"].is_u64());
    }
    assert_eq!(clauses[0]["type"], "financial");
    assert_eq!(clauses[1]["type"], "liability");
    let total: u64 = clauses.iter().map(|c| c["length"].as_u64().unwrap()).sum();
    assert_eq!(value["total_length"], total);
}

#[tokio::test]
async fn empty_document_is_a_valid_result() {
    let tools = seeded_tools(Arc::new(RecordingMetrics::new())).await;
    let value = parse(&tools.call("extract_clauses", "").await.unwrap());
    assert_eq!(value["num_clauses"], 0);
    assert_eq!(value["clauses"].as_array().unwrap().len(), 0);
    assert_eq!(value["total_length"], 0);
}

#[tokio::test]
async fn long_documents_cap_returned_clauses() {
    let tools = seeded_tools(Arc::new(RecordingMetrics::new())).await;
    let document: String = (0..20)
        .map(|i| format!("Clause {i}: the supplier delivers goods on schedule.\n\n"))
        .collect();
    let extraction = tools.extract_clauses(&document);
    assert_eq!(extraction.num_clauses, 20);
    assert_eq!(extraction.clauses.len(), 15);
    let returned: usize = extraction.clauses.iter().map(|c| c.length).sum();
    assert!(extraction.total_length >= returned);
}

#[tokio::test]
async fn score_risk_contract() {
    let tools = seeded_tools(Arc::new(RecordingMetrics::new())).await;
    let clause = "Licensee grants unlimited liability, no warranty, perpetual rights and agrees to waive all rights. ".repeat(3);
    let value = parse(&tools.call("score_risk", &clause).await.unwrap());

    assert_eq!(value["risk_level"], "HIGH");
    let score = value["risk_score"].as_f64().unwrap();
    assert!((0.0..=10.0).contains(&score));
    assert_eq!(score, 10.0);
    assert!(value["high_risk_indicators"].as_u64().unwrap() >= 2);
    assert!(value["additional_risk_score"].as_f64().unwrap() >= 3.0);

    let preview = value["clause_preview"].as_str().unwrap();
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 153);
    assert_eq!(
        value["recommendation"],
        "Immediate legal review required - high risk terms identified"
    );
}

#[tokio::test]
async fn low_risk_clause_is_scored_low() {
    let tools = seeded_tools(Arc::new(RecordingMetrics::new())).await;
    let report = tools.score_risk("mutual agreement in good faith, best efforts");
    assert_eq!(report.risk_level, clausefp::RiskLevel::Low);
    assert_eq!(report.recommendation, "Standard review - low risk terms");
    let json = parse(&report.to_json().unwrap());
    assert_eq!(json["clause_preview"], "mutual agreement in good faith, best efforts");
}

#[tokio::test]
async fn medium_score_on_a_tie_rounds_half_to_even() {
    let tools = seeded_tools(Arc::new(RecordingMetrics::new())).await;
    let clause = "Liquidated damages apply and the provider may terminate the service.";
    let report = tools.score_risk(clause);
    assert_eq!(report.risk_level, clausefp::RiskLevel::Medium);
    assert_eq!(report.risk_score, 7.25);

    let value = parse(&tools.call("score_risk", clause).await.unwrap());
    assert_eq!(value["risk_level"], "MEDIUM");
    assert_eq!(value["risk_score"], 7.2);
    assert_eq!(value["additional_risk_score"], 2.5);
}

#[tokio::test]
async fn search_legal_db_contract() {
    let tools = seeded_tools(Arc::new(RecordingMetrics::new())).await;
    let query = "Payment terms are Net 30 days from invoice date.";
    let value = parse(&tools.call("search_legal_db", query).await.unwrap());

    assert_eq!(value["query"], query);
    assert_eq!(value["num_results"], 5);
    let results = value["results"].as_array().unwrap();
    assert_eq!(results.len(), 5);

    let top = &results[0];
    assert_eq!(top["clause"], query);
    assert_eq!(top["type"], "financial");
    assert_eq!(top["document_id"], "DOC002");
    assert!(top["similarity"].as_f64().unwrap() > 0.99);

    let sims: Vec<f64> = results
        .iter()
        .map(|r| r["similarity"].as_f64().unwrap())
        .collect();
    assert!(sims.windows(2).all(|w| w[0] >= w[1]));
    for sim in sims {
        // Rounded to three decimals.
        assert!(((sim * 1000.0).round() - sim * 1000.0).abs() < 1e-6);
    }
}

#[tokio::test]
async fn observers_read_structured_counts() {
    let metrics = Arc::new(RecordingMetrics::new());
    let tools = seeded_tools(metrics.clone()).await;

    tools.extract_clauses("Section 1. The supplier shall deliver goods on time.");
    tools.score_risk("Either party may terminate at our discretion without notice.");
    tools.search_legal_db("liability").await.unwrap();

    assert_eq!(metrics.events_for(Operation::ExtractClauses)[0].items, 1);
    assert_eq!(metrics.events_for(Operation::ScoreRisk)[0].items, 1);
    assert_eq!(metrics.events_for(Operation::Search)[0].items, 5);
    assert_eq!(metrics.events_for(Operation::Insert)[0].items, 8);
    assert_eq!(metrics.labels(), vec![(Operation::ScoreRisk, "MEDIUM")]);
}

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let tools = seeded_tools(Arc::new(RecordingMetrics::new())).await;
    let err = tools.call("draft_contract", "anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
