//! Session-scoped vector index over document chunks.
//!
//! Searches take a shared lock; [`KnowledgeIndex::rebuild`] takes the
//! exclusive lock, so searches issued during a rebuild wait for it to finish
//! and never observe a half-built index.

use crate::embeddings::{check_dimensions, EmbeddingProvider};
use crate::types::{Chunk, ScoredChunk};
use crate::vector_index::{FlatIndex, NearestNeighbor};
use meridian_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct IndexState {
    chunks: Vec<Chunk>,
    by_id: HashMap<String, usize>,
    backend: Box<dyn NearestNeighbor>,
}

/// Vector index bound to one embedding function.
pub struct KnowledgeIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    min_score: f32,
    state: RwLock<IndexState>,
}

impl KnowledgeIndex {
    /// Create an empty index using the brute-force backend.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_backend(embedder, Box::new(FlatIndex::new()))
    }

    /// Create an empty index with a custom nearest-neighbor backend.
    pub fn with_backend(
        embedder: Arc<dyn EmbeddingProvider>,
        backend: Box<dyn NearestNeighbor>,
    ) -> Self {
        Self {
            embedder,
            min_score: f32::MIN,
            state: RwLock::new(IndexState {
                chunks: Vec::new(),
                by_id: HashMap::new(),
                backend,
            }),
        }
    }

    /// Drop search hits scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.chunks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.chunks.is_empty()
    }

    /// Distinct source names in ingestion order.
    pub async fn source_names(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = Vec::new();
        for chunk in &state.chunks {
            if !names.contains(&chunk.source_name) {
                names.push(chunk.source_name.clone());
            }
        }
        names
    }

    /// Replace the index contents with `chunks`.
    ///
    /// Chunks without an embedding are embedded here. Every vector must
    /// match the embedder's dimensions. Duplicate chunk ids keep the first
    /// occurrence. On error the previous contents are left untouched.
    /// Returns the number of indexed chunks.
    pub async fn rebuild(&self, chunks: Vec<Chunk>) -> AppResult<usize> {
        let mut state = self.state.write().await;

        let chunks = self.embed_missing(chunks).await?;

        let mut by_id = HashMap::with_capacity(chunks.len());
        let mut kept = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let embedding = chunk.embedding.as_deref().ok_or_else(|| {
                AppError::Knowledge(format!("Chunk {} has no embedding", chunk.id))
            })?;
            check_dimensions(self.embedder.as_ref(), embedding)?;

            if by_id.contains_key(&chunk.id) {
                tracing::debug!(source = %chunk.source_name, position = chunk.position, "Skipping duplicate chunk");
                continue;
            }
            by_id.insert(chunk.id.clone(), kept.len());
            kept.push(chunk);
        }

        state.backend.clear();
        for chunk in &kept {
            if let Some(embedding) = chunk.embedding.clone() {
                state.backend.insert(&chunk.id, embedding)?;
            }
        }
        state.chunks = kept;
        state.by_id = by_id;

        tracing::info!(
            chunks = state.chunks.len(),
            provider = self.embedder.provider_name(),
            model = self.embedder.model_name(),
            "Rebuilt vector index"
        );

        Ok(state.chunks.len())
    }

    async fn embed_missing(&self, mut chunks: Vec<Chunk>) -> AppResult<Vec<Chunk>> {
        let missing: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, chunk)| chunk.embedding.is_none())
            .map(|(i, _)| i)
            .collect();

        if missing.is_empty() {
            return Ok(chunks);
        }

        let texts: Vec<String> = missing.iter().map(|&i| chunks[i].text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        for (i, embedding) in missing.into_iter().zip(embeddings) {
            chunks[i].embedding = Some(embedding);
        }
        Ok(chunks)
    }

    /// Find the `k` chunks nearest to `query`.
    ///
    /// `k == 0` is a configuration error. An empty index yields an empty
    /// result without embedding the query.
    pub async fn search(&self, query: &str, k: usize) -> AppResult<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(AppError::Config(
                "Search requires k of at least 1".to_string(),
            ));
        }

        if self.is_empty().await {
            tracing::debug!("Vector index is empty, no document evidence");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        check_dimensions(self.embedder.as_ref(), &query_embedding)?;

        let state = self.state.read().await;
        let hits = state.backend.query(&query_embedding, k)?;

        let results: Vec<ScoredChunk> = hits
            .into_iter()
            .filter(|(_, score)| *score >= self.min_score)
            .filter_map(|(id, score)| {
                state.by_id.get(&id).map(|&i| ScoredChunk {
                    chunk: state.chunks[i].clone(),
                    score,
                })
            })
            .collect();

        tracing::debug!(
            k,
            hits = results.len(),
            top_score = results.first().map(|r| r.score).unwrap_or(0.0),
            "Vector search completed"
        );

        Ok(results)
    }
}
