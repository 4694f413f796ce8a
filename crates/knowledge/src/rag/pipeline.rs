//! End-to-end query turn: route, assemble, synthesize.

use crate::cancel::CancellationToken;
use crate::index::KnowledgeIndex;
use crate::rag::aggregator::{AggregatorSettings, EvidenceAggregator};
use crate::rag::router::QueryRouter;
use crate::rag::synthesizer::AnswerSynthesizer;
use crate::rag::types::RagOutcome;
use meridian_core::{AppConfig, AppError, AppResult};
use meridian_llm::LlmClient;
use meridian_prompt::{load_prompt, ANSWER_PROMPT_ID, ROUTE_PROMPT_ID};
use meridian_web::WebEvidenceFetcher;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

pub struct RagPipeline {
    router: QueryRouter,
    aggregator: EvidenceAggregator,
    synthesizer: AnswerSynthesizer,
}

impl RagPipeline {
    pub fn new(
        router: QueryRouter,
        aggregator: EvidenceAggregator,
        synthesizer: AnswerSynthesizer,
    ) -> Self {
        Self {
            router,
            aggregator,
            synthesizer,
        }
    }

    /// Wire a pipeline from configuration.
    ///
    /// Prompts are loaded from the workspace (overrides) or the built-ins.
    /// The same model serves routing and synthesis.
    pub fn from_config(
        config: &AppConfig,
        index: Arc<KnowledgeIndex>,
        llm: Arc<dyn LlmClient>,
        web: WebEvidenceFetcher,
    ) -> AppResult<Self> {
        let route_prompt = load_prompt(&config.workspace, ROUTE_PROMPT_ID)?;
        let answer_prompt = load_prompt(&config.workspace, ANSWER_PROMPT_ID)?;

        let router = QueryRouter::new(
            llm.clone(),
            config.model.clone(),
            route_prompt,
            index.clone(),
            Duration::from_secs(config.rag.router_timeout_secs),
        )
        .with_temperature(config.rag.temperature);

        let aggregator =
            EvidenceAggregator::new(index, web, AggregatorSettings::from_config(config));

        let synthesizer = AnswerSynthesizer::new(
            llm,
            config.model.clone(),
            answer_prompt,
            Duration::from_secs(config.rag.synthesis_timeout_secs),
        )
        .with_temperature(config.rag.temperature);

        Ok(Self::new(router, aggregator, synthesizer))
    }

    pub fn router(&self) -> &QueryRouter {
        &self.router
    }

    pub fn aggregator(&self) -> &EvidenceAggregator {
        &self.aggregator
    }

    /// Answer one query.
    ///
    /// Cancelling `cancel` drops every in-flight call (which aborts their
    /// HTTP requests) and returns [`AppError::Cancelled`].
    pub async fn ask(&self, query: &str, cancel: &CancellationToken) -> AppResult<RagOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Config("Query must not be empty".to_string()));
        }
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let query_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("query", id = %query_id);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(parent: &span, "Query cancelled");
                Err(AppError::Cancelled)
            }
            outcome = self.run(query).instrument(span.clone()) => outcome,
        }
    }

    async fn run(&self, query: &str) -> AppResult<RagOutcome> {
        tracing::info!(query_len = query.len(), "Answering query");

        let decision = self.router.route(query).await;
        let bundle = self.aggregator.assemble(&decision, query).await?;
        let answer = self.synthesizer.generate(query, &bundle).await?;

        Ok(RagOutcome {
            decision,
            bundle,
            answer,
        })
    }
}
