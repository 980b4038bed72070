use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ClauseRecord;

/// Candidate sets at or above this size are scored on the rayon pool.
const PARALLEL_THRESHOLD: usize = 2048;

/// One ranked match from [`ClauseIndex::search`](crate::ClauseIndex::search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub id: u64,
    pub text: String,
    pub document_id: Option<String>,
    pub clause_type: Option<String>,
    pub metadata: serde_json::Value,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

impl SimilarityResult {
    pub(crate) fn from_record(record: &ClauseRecord, similarity: f32) -> Self {
        Self {
            id: record.id,
            text: record.text.clone(),
            document_id: record.document_id.clone(),
            clause_type: record.clause_type.clone(),
            metadata: record.metadata.clone(),
            similarity,
        }
    }
}

/// Cosine similarity; 0 when either side has zero norm or lengths differ.
#[inline]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0f32, 0f32, 0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Score `positions` of `records` against `query` and keep the best `k`.
///
/// Ties are broken by ascending id so equal scores come back in insertion
/// order.
pub(crate) fn rank(
    records: &[ClauseRecord],
    positions: &[usize],
    query: &[f32],
    k: usize,
) -> Vec<(usize, f32)> {
    let score = |&pos: &usize| (pos, cosine(query, &records[pos].embedding));
    let mut scored: Vec<(usize, f32)> = if positions.len() >= PARALLEL_THRESHOLD {
        positions.par_iter().map(score).collect()
    } else {
        positions.iter().map(score).collect()
    };

    scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => records[a.0].id.cmp(&records[b.0].id),
        other => other,
    });
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::INDEX_SCHEMA_VERSION;
    use chrono::Utc;
    use serde_json::json;

    fn record(id: u64, embedding: Vec<f32>) -> ClauseRecord {
        ClauseRecord {
            schema_version: INDEX_SCHEMA_VERSION,
            id,
            text: format!("clause {id}"),
            document_id: None,
            clause_type: None,
            metadata: json!({}),
            embedding,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn cosine_handles_degenerate_input() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine(&[], &[]), 0.0);
        assert!((cosine(&[2.0, 0.0], &[5.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rank_orders_by_similarity_then_id() {
        let records = vec![
            record(1, vec![0.0, 1.0]),
            record(2, vec![1.0, 0.0]),
            record(3, vec![1.0, 0.0]),
            record(4, vec![1.0, 1.0]),
        ];
        let ranked = rank(&records, &[0, 1, 2, 3], &[1.0, 0.0], 3);
        let ids: Vec<u64> = ranked.iter().map(|(p, _)| records[*p].id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn parallel_and_serial_paths_agree() {
        let records: Vec<ClauseRecord> = (0..PARALLEL_THRESHOLD as u64 + 10)
            .map(|i| record(i + 1, vec![(i % 7) as f32, 1.0]))
            .collect();
        let all: Vec<usize> = (0..records.len()).collect();
        let big = rank(&records, &all, &[1.0, 0.0], 5);
        let small = rank(&records, &all[..20], &[1.0, 0.0], 5);
        assert_eq!(big[0].1, small[0].1);
        assert_eq!(records[big[0].0].id, records[small[0].0].id);
    }
}
