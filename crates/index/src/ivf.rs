//! Inverted-file partitioning for cosine search.
//!
//! Vectors are grouped into `lists` clusters by spherical k-means. A query
//! ranks the centroids and only scans the members of the `probes` closest
//! lists. Below [`IndexConfig::min_vectors_for_ivf`](crate::IndexConfig)
//! the index is not built and callers fall back to an exact scan.
//!
//! Recall drops when `probes` is small relative to `lists`; `probes == lists`
//! is exact.

use rayon::prelude::*;

use crate::query::cosine;

/// Trained partitions over positions in the record table.
#[derive(Debug, Clone)]
pub struct IvfIndex {
    centroids: Vec<Vec<f32>>,
    lists: Vec<Vec<usize>>,
    trained_on: usize,
}

impl IvfIndex {
    /// Cluster `vectors` into at most `lists` partitions.
    ///
    /// Initial centroids are evenly spaced picks from the input so training is
    /// deterministic for a given insertion order.
    pub fn train(vectors: &[&[f32]], lists: usize, iterations: usize) -> Self {
        let n = vectors.len();
        let k = lists.min(n).max(1);
        if n == 0 {
            return Self {
                centroids: Vec::new(),
                lists: Vec::new(),
                trained_on: 0,
            };
        }

        let mut centroids: Vec<Vec<f32>> = (0..k)
            .map(|i| unit(vectors[i * n / k].to_vec()))
            .collect();
        let mut assignment = vec![0usize; n];

        for _ in 0..iterations.max(1) {
            let next: Vec<usize> = vectors
                .par_iter()
                .map(|v| nearest(&centroids, v))
                .collect();
            let changed = next != assignment;
            assignment = next;

            let dim = vectors[0].len();
            let mut sums = vec![vec![0f32; dim]; k];
            let mut counts = vec![0usize; k];
            for (v, &c) in vectors.iter().zip(&assignment) {
                counts[c] += 1;
                for (s, x) in sums[c].iter_mut().zip(v.iter()) {
                    *s += *x;
                }
            }
            for (c, sum) in sums.into_iter().enumerate() {
                // Empty clusters keep their previous centroid.
                if counts[c] > 0 {
                    centroids[c] = unit(sum);
                }
            }
            if !changed {
                break;
            }
        }

        let mut members = vec![Vec::new(); k];
        for (pos, &c) in assignment.iter().enumerate() {
            members[c].push(pos);
        }
        tracing::debug!(vectors = n, lists = k, "trained ivf partitions");
        Self {
            centroids,
            lists: members,
            trained_on: n,
        }
    }

    /// Route a newly appended vector to its closest list.
    pub fn assign(&mut self, position: usize, vector: &[f32]) {
        if self.centroids.is_empty() {
            return;
        }
        let c = nearest(&self.centroids, vector);
        self.lists[c].push(position);
    }

    /// Record positions in the `probes` lists closest to `query`, ascending.
    pub fn candidates(&self, query: &[f32], probes: usize) -> Vec<usize> {
        let mut ranked: Vec<(usize, f32)> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, cosine(query, c)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut out: Vec<usize> = ranked
            .into_iter()
            .take(probes.max(1))
            .flat_map(|(i, _)| self.lists[i].iter().copied())
            .collect();
        out.sort_unstable();
        out
    }

    pub fn list_count(&self) -> usize {
        self.centroids.len()
    }

    /// Number of vectors seen at the last training run.
    pub fn trained_on(&self) -> usize {
        self.trained_on
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn nearest(centroids: &[Vec<f32>], v: &[f32]) -> usize {
    let mut best = 0;
    let mut best_sim = f32::NEG_INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let sim = cosine(v, c);
        if sim > best_sim {
            best = i;
            best_sim = sim;
        }
    }
    best
}

fn unit(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}
