use retrieval::{NewClause, RetrievalError, SimilarityStore};
use serde_json::json;

/// `(document, type, section, risk, text)` for the bundled sample clauses.
const SAMPLE_CLAUSES: [(&str, &str, &str, &str, &str); 8] = [
    (
        "DOC001",
        "liability",
        "8.1",
        "high",
        "The Company shall have unlimited liability for any damages arising from gross negligence or willful misconduct.",
    ),
    (
        "DOC001",
        "termination",
        "12.1",
        "low",
        "Either party may terminate this agreement with 30 days written notice.",
    ),
    (
        "DOC002",
        "confidentiality",
        "6.2",
        "medium",
        "All confidential information shall be kept secret for a period of 5 years.",
    ),
    (
        "DOC002",
        "financial",
        "4.1",
        "low",
        "Payment terms are Net 30 days from invoice date.",
    ),
    (
        "DOC003",
        "liability",
        "9.1",
        "high",
        "The service is provided as-is without any warranty, express or implied.",
    ),
    (
        "DOC003",
        "liability",
        "8.2",
        "high",
        "Party A shall indemnify and hold harmless Party B from all claims, damages, and expenses.",
    ),
    (
        "DOC004",
        "general",
        "15.1",
        "low",
        "This agreement shall be governed by the laws of the State of California.",
    ),
    (
        "DOC004",
        "force_majeure",
        "13.1",
        "low",
        "In the event of force majeure, neither party shall be liable for delays or failures.",
    ),
];

pub fn sample_clauses() -> Vec<NewClause> {
    SAMPLE_CLAUSES
        .iter()
        .map(|(doc, ty, section, risk, text)| {
            NewClause::new(*text)
                .with_document_id(*doc)
                .with_clause_type(*ty)
                .with_metadata(json!({ "section": section, "risk_level": risk }))
        })
        .collect()
}

/// Insert the sample clauses as one batch.
pub async fn seed_sample_data(store: &SimilarityStore) -> Result<Vec<u64>, RetrievalError> {
    let ids = store.add(sample_clauses()).await?;
    tracing::info!(clauses = ids.len(), "seeded sample clauses");
    Ok(ids)
}
