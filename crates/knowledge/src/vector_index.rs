//! Nearest-neighbor backend abstraction.
//!
//! Backends are rebuilt from scratch and never persisted. Scores are cosine
//! similarities; ordering is descending score with ties resolved by insertion
//! order.

use meridian_core::{AppError, AppResult};
use std::cmp::Ordering;

/// Trait for nearest-neighbor backends.
pub trait NearestNeighbor: Send + Sync {
    /// Add a vector under `id`.
    fn insert(&mut self, id: &str, vector: Vec<f32>) -> AppResult<()>;

    /// Return up to `k` `(id, score)` pairs, nearest first.
    fn query(&self, vector: &[f32], k: usize) -> AppResult<Vec<(String, f32)>>;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every vector.
    fn clear(&mut self);
}

/// Brute-force backend: exact cosine similarity against every stored vector.
#[derive(Debug, Default)]
pub struct FlatIndex {
    dimensions: Option<usize>,
    entries: Vec<(String, Vec<f32>)>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NearestNeighbor for FlatIndex {
    fn insert(&mut self, id: &str, vector: Vec<f32>) -> AppResult<()> {
        match self.dimensions {
            Some(dims) if dims != vector.len() => {
                return Err(AppError::Config(format!(
                    "Embedding dimension mismatch: index holds {}-dimensional vectors, got {}",
                    dims,
                    vector.len()
                )));
            }
            Some(_) => {}
            None => self.dimensions = Some(vector.len()),
        }

        self.entries.push((id.to_string(), vector));
        Ok(())
    }

    fn query(&self, vector: &[f32], k: usize) -> AppResult<Vec<(String, f32)>> {
        if let Some(dims) = self.dimensions {
            if dims != vector.len() {
                return Err(AppError::Config(format!(
                    "Embedding dimension mismatch: index holds {}-dimensional vectors, query has {}",
                    dims,
                    vector.len()
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, stored))| (i, cosine_similarity(vector, stored)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, score)| (self.entries[i].0.clone(), score))
            .collect())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.dimensions = None;
    }
}

/// Cosine similarity; zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(results: &[(String, f32)]) -> Vec<&str> {
        results.iter().map(|(id, _)| id.as_str()).collect()
    }

    #[test]
    fn test_query_ranks_by_cosine() {
        let mut index = FlatIndex::new();
        index.insert("rust", vec![1.0, 0.5, 0.2, 0.1]).unwrap();
        index.insert("pasta", vec![-0.3, -0.8, 0.4, -0.2]).unwrap();
        index.insert("systems", vec![0.8, 0.6, 0.0, 0.0]).unwrap();

        let results = index.query(&[0.9, 0.4, 0.3, 0.1], 5).unwrap();
        assert_eq!(ids(&results), vec!["rust", "systems", "pasta"]);
        assert!(results[0].1 > 0.9);
        assert!(results[2].1 < 0.0);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = FlatIndex::new();
        index.insert("first", vec![1.0, 0.0]).unwrap();
        index.insert("second", vec![2.0, 0.0]).unwrap();
        index.insert("third", vec![0.5, 0.0]).unwrap();

        let results = index.query(&[1.0, 0.0], 3).unwrap();
        assert_eq!(ids(&results), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_k_limits_results() {
        let mut index = FlatIndex::new();
        for i in 0..10 {
            index.insert(&format!("c{}", i), vec![1.0, i as f32]).unwrap();
        }
        assert_eq!(index.query(&[1.0, 0.0], 3).unwrap().len(), 3);
    }

    #[test]
    fn test_dimension_mismatch_is_config_error() {
        let mut index = FlatIndex::new();
        index.insert("a", vec![1.0, 0.0]).unwrap();

        assert!(matches!(
            index.insert("b", vec![1.0, 0.0, 0.0]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(index.query(&[1.0], 1), Err(AppError::Config(_))));
    }

    #[test]
    fn test_clear_resets_dimensions() {
        let mut index = FlatIndex::new();
        index.insert("a", vec![1.0, 0.0]).unwrap();
        index.clear();

        assert!(index.is_empty());
        assert!(index.insert("b", vec![1.0, 0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
