//! Scripted collaborators for pipeline tests.

use crate::embeddings::{EmbeddingProvider, TrigramProvider};
use crate::index::KnowledgeIndex;
use crate::rag::{AggregatorSettings, AnswerSynthesizer, EvidenceAggregator, QueryRouter, RagPipeline};
use crate::types::Chunk;
use meridian_core::{AppError, AppResult, EvidenceOrder};
use meridian_llm::{LlmClient, LlmRequest, LlmResponse};
use meridian_prompt::builtin;
use meridian_web::{WebEvidenceFetcher, WebSearchProvider, WebSnippet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const WEB_TIMEOUT: Duration = Duration::from_millis(20);
pub const LLM_TIMEOUT: Duration = Duration::from_secs(5);

/// Language model double with a fixed reply, an optional delay and a call log.
pub struct ScriptedLlm {
    reply: Option<String>,
    delay: Duration,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            delay,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<LlmRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        match &self.reply {
            Some(reply) => Ok(LlmResponse::text(reply.as_str(), request.model.as_str())),
            None => Err(AppError::Llm("model unavailable".to_string())),
        }
    }
}

/// Web provider double: fixed snippets, a failure, or a hang.
pub enum WebBehavior {
    Results(Vec<(&'static str, &'static str)>),
    Fails,
    Hangs(Duration),
    Delayed(Duration, Vec<(&'static str, &'static str)>),
}

pub struct ScriptedWeb {
    behavior: WebBehavior,
    calls: AtomicUsize,
}

impl ScriptedWeb {
    pub fn new(behavior: WebBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WebSearchProvider for ScriptedWeb {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, _query: &str, max_results: usize) -> AppResult<Vec<WebSnippet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            WebBehavior::Results(results) => Ok(results
                .iter()
                .take(max_results)
                .map(|(url, text)| WebSnippet::new("result", *url, *text))
                .collect()),
            WebBehavior::Fails => Err(AppError::Web("rate limited".to_string())),
            WebBehavior::Hangs(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Vec::new())
            }
            WebBehavior::Delayed(delay, results) => {
                tokio::time::sleep(*delay).await;
                Ok(results
                    .iter()
                    .take(max_results)
                    .map(|(url, text)| WebSnippet::new("result", *url, *text))
                    .collect())
            }
        }
    }
}

/// Embedder that maps every text to the first unit vector, optionally after
/// a delay, and optionally with the wrong length.
#[derive(Debug)]
pub struct ScriptedEmbedder {
    dims: usize,
    output_dims: usize,
    delay: Duration,
}

impl ScriptedEmbedder {
    pub fn slow(dims: usize, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            dims,
            output_dims: dims,
            delay,
        })
    }

    pub fn mismatched(dims: usize, output_dims: usize) -> Arc<Self> {
        Arc::new(Self {
            dims,
            output_dims,
            delay: Duration::ZERO,
        })
    }

    pub fn unit(dims: usize) -> Vec<f32> {
        (0..dims).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for ScriptedEmbedder {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        tokio::time::sleep(self.delay).await;
        Ok(texts.iter().map(|_| Self::unit(self.output_dims)).collect())
    }
}

/// Index over pre-embedded chunks, so building it never calls `embedder`.
pub async fn index_over(
    embedder: Arc<ScriptedEmbedder>,
    documents: &[(&str, &str)],
) -> Arc<KnowledgeIndex> {
    let dims = embedder.dimensions();
    let index = Arc::new(KnowledgeIndex::new(embedder));
    let chunks = documents
        .iter()
        .map(|(source, text)| {
            Chunk::new(*source, 0, *text).with_embedding(ScriptedEmbedder::unit(dims))
        })
        .collect();
    index.rebuild(chunks).await.unwrap();
    index
}

/// Index over `(source_name, text)` pairs, one chunk each, in order.
pub async fn index_with(documents: &[(&str, &str)]) -> Arc<KnowledgeIndex> {
    let index = Arc::new(KnowledgeIndex::new(Arc::new(TrigramProvider::new(384))));
    let chunks = documents
        .iter()
        .map(|(source, text)| Chunk::new(*source, 0, *text))
        .collect();
    index.rebuild(chunks).await.unwrap();
    index
}

pub fn web_fetcher(provider: Arc<ScriptedWeb>) -> WebEvidenceFetcher {
    WebEvidenceFetcher::new(provider, WEB_TIMEOUT)
}

pub fn settings() -> AggregatorSettings {
    AggregatorSettings {
        top_k: 5,
        web_results: 3,
        budget_chars: 6000,
        order: EvidenceOrder::DocumentsFirst,
    }
}

pub fn pipeline(
    router_llm: Arc<ScriptedLlm>,
    answer_llm: Arc<ScriptedLlm>,
    index: Arc<KnowledgeIndex>,
    web: WebEvidenceFetcher,
) -> RagPipeline {
    let router = QueryRouter::new(
        router_llm,
        "test-model",
        builtin::get(builtin::ROUTE_PROMPT_ID).unwrap(),
        index.clone(),
        LLM_TIMEOUT,
    );
    let aggregator = EvidenceAggregator::new(index, web, settings());
    let synthesizer = AnswerSynthesizer::new(
        answer_llm,
        "test-model",
        builtin::get(builtin::ANSWER_PROMPT_ID).unwrap(),
        LLM_TIMEOUT,
    );
    RagPipeline::new(router, aggregator, synthesizer)
}
