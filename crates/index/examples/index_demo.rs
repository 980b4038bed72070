use index::{BackendConfig, ClauseIndex, IndexConfig, IndexError, NewClause, StoreHandle};
use serde_json::json;

fn main() -> Result<(), IndexError> {
    let store = StoreHandle::open(&BackendConfig::in_memory())?;
    let index = ClauseIndex::open(&store, IndexConfig::default().with_dimension(4))?;

    // Two payment clauses that point the same way and one liability clause.
    let ids = index.insert_batch(vec![
        (
            NewClause::new("Payment terms are Net 30 days from invoice date.")
                .with_document_id("DOC002")
                .with_clause_type("financial")
                .with_metadata(json!({"section": "5.1"})),
            vec![0.9, 0.1, 0.0, 0.0],
        ),
        (
            NewClause::new("Late payments incur interest at 1.5% per month.")
                .with_document_id("DOC002")
                .with_clause_type("financial"),
            vec![0.8, 0.2, 0.1, 0.0],
        ),
        (
            NewClause::new("Liability is capped at fees paid in the prior twelve months.")
                .with_document_id("DOC003")
                .with_clause_type("liability"),
            vec![0.0, 0.1, 0.9, 0.3],
        ),
    ])?;
    println!("inserted ids {ids:?}");

    for hit in index.search(&[1.0, 0.1, 0.0, 0.0], 2)? {
        println!(
            "#{:<3} {:.3} {:<10} {}",
            hit.id,
            hit.similarity,
            hit.clause_type.as_deref().unwrap_or("-"),
            hit.text
        );
    }

    let stats = index.stats()?;
    println!(
        "{} clauses across {} documents",
        stats.clause_count, stats.document_count
    );
    store.close()
}
