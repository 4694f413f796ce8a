//! Tests for retrieval ranking as seen by the aggregator.

use crate::embeddings::EmbeddingProvider;
use crate::index::KnowledgeIndex;
use crate::rag::{AggregatorSettings, DecisionSource, EvidenceAggregator, Route, RoutingDecision};
use crate::types::Chunk;
use meridian_core::{AppResult, EvidenceOrder};
use meridian_web::WebEvidenceFetcher;
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    /// Embeds every text to the same vector; chunks carry their own.
    #[derive(Debug)]
    struct QueryEmbedder(Vec<f32>);

    #[async_trait::async_trait]
    impl EmbeddingProvider for QueryEmbedder {
        fn provider_name(&self) -> &str {
            "query"
        }
        fn model_name(&self) -> &str {
            "query"
        }
        fn dimensions(&self) -> usize {
            self.0.len()
        }
        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }
    }

    /// Helper to create a test chunk with embedding.
    fn create_test_chunk(source: &str, position: u32, text: &str, embedding: Vec<f32>) -> Chunk {
        Chunk::new(source, position, text).with_embedding(normalize(&embedding))
    }

    /// Helper to create a normalized embedding.
    fn normalize(v: &[f32]) -> Vec<f32> {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            return v.to_vec();
        }
        v.iter().map(|x| x / norm).collect()
    }

    fn documents() -> RoutingDecision {
        RoutingDecision {
            route: Route::Document,
            source: DecisionSource::Oracle,
            rationale: "test".to_string(),
        }
    }

    async fn aggregator(
        chunks: Vec<Chunk>,
        settings: AggregatorSettings,
        min_score: Option<f32>,
    ) -> EvidenceAggregator {
        let mut index = KnowledgeIndex::new(Arc::new(QueryEmbedder(vec![1.0, 0.0, 0.0])));
        if let Some(min_score) = min_score {
            index = index.with_min_score(min_score);
        }
        index.rebuild(chunks).await.unwrap();
        EvidenceAggregator::new(Arc::new(index), WebEvidenceFetcher::disabled(), settings)
    }

    fn settings(top_k: usize, budget_chars: usize) -> AggregatorSettings {
        AggregatorSettings {
            top_k,
            web_results: 0,
            budget_chars,
            order: EvidenceOrder::DocumentsFirst,
        }
    }

    #[tokio::test]
    async fn test_ranking_order_by_similarity() {
        let chunks = vec![
            create_test_chunk("far.md", 0, "far", vec![0.0, 1.0, 0.0]),
            create_test_chunk("near.md", 0, "near", vec![0.9, 0.1, 0.0]),
            create_test_chunk("mid.md", 0, "mid", vec![0.5, 0.5, 0.0]),
        ];

        let bundle = aggregator(chunks, settings(3, 1000), None)
            .await
            .assemble(&documents(), "q")
            .await
            .unwrap();

        let tags: Vec<&str> = bundle.records.iter().map(|r| r.source_tag.as_str()).collect();
        assert_eq!(tags, vec!["near.md", "mid.md", "far.md"], "Most similar first");

        let scores: Vec<f32> = bundle.records.iter().filter_map(|r| r.score).collect();
        assert!(
            scores.windows(2).all(|w| w[0] >= w[1]),
            "Scores must be non-increasing: {:?}",
            scores
        );
    }

    #[tokio::test]
    async fn test_equal_scores_keep_ingestion_order() {
        let chunks = vec![
            create_test_chunk("first.md", 0, "one", vec![1.0, 1.0, 0.0]),
            create_test_chunk("second.md", 0, "two", vec![1.0, 0.0, 1.0]),
            create_test_chunk("third.md", 0, "three", vec![1.0, 1.0, 0.0]),
        ];

        let bundle = aggregator(chunks, settings(3, 1000), None)
            .await
            .assemble(&documents(), "q")
            .await
            .unwrap();

        let tags: Vec<&str> = bundle.records.iter().map(|r| r.source_tag.as_str()).collect();
        assert_eq!(tags, vec!["first.md", "second.md", "third.md"]);
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let chunks = (0..10)
            .map(|i| {
                create_test_chunk(
                    &format!("doc{}.md", i),
                    0,
                    "text",
                    vec![1.0, i as f32 * 0.1, 0.0],
                )
            })
            .collect();

        let bundle = aggregator(chunks, settings(4, 1000), None)
            .await
            .assemble(&documents(), "q")
            .await
            .unwrap();

        assert_eq!(bundle.len(), 4, "Should return exactly top_k results");
        assert_eq!(bundle.records[0].source_tag, "doc0.md");
    }

    #[tokio::test]
    async fn test_min_score_filters_weak_matches() {
        let chunks = vec![
            create_test_chunk("strong.md", 0, "strong", vec![1.0, 0.1, 0.0]),
            create_test_chunk("weak.md", 0, "weak", vec![0.1, 1.0, 0.0]),
        ];

        let bundle = aggregator(chunks, settings(5, 1000), Some(0.5))
            .await
            .assemble(&documents(), "q")
            .await
            .unwrap();

        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.records[0].source_tag, "strong.md");
    }

    #[tokio::test]
    async fn test_chunks_from_one_file_share_a_citation() {
        let chunks = vec![
            create_test_chunk("guide.md", 0, "part one", vec![1.0, 0.0, 0.0]),
            create_test_chunk("other.md", 0, "elsewhere", vec![0.8, 0.2, 0.0]),
            create_test_chunk("guide.md", 1, "part two", vec![0.9, 0.1, 0.0]),
        ];

        let bundle = aggregator(chunks, settings(5, 1000), None)
            .await
            .assemble(&documents(), "q")
            .await
            .unwrap();

        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.records[0].citation_label, "Doc: guide.md");
        assert_eq!(bundle.records[0].text, "part one\n\npart two");
        assert_eq!(bundle.used, bundle.records.iter().map(|r| r.len()).sum::<usize>());
    }

    #[tokio::test]
    async fn test_budget_never_exceeded() {
        let chunks: Vec<Chunk> = (0..6)
            .map(|i| {
                create_test_chunk(
                    &format!("doc{}.md", i),
                    0,
                    &"x".repeat(40),
                    vec![1.0, i as f32 * 0.1, 0.0],
                )
            })
            .collect();

        for budget in [0, 39, 40, 100, 1000] {
            let bundle = aggregator(chunks.clone(), settings(6, budget), None)
                .await
                .assemble(&documents(), "q")
                .await
                .unwrap();
            let total: usize = bundle.records.iter().map(|r| r.len()).sum();
            assert!(total <= budget, "budget {} exceeded: {}", budget, total);
            assert_eq!(bundle.len(), (budget / 40).min(6));
        }
    }
}
