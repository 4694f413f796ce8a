//! Query routing.
//!
//! A language model classifies each query as DOC, WEB or HYBRID. Any failure
//! (transport error, timeout, unparseable reply) falls back to a
//! deterministic rule, so routing never aborts a query.

use crate::index::KnowledgeIndex;
use crate::rag::types::{DecisionSource, Route, RoutingDecision};
use crate::types::SourceType;
use meridian_core::{AppError, AppResult};
use meridian_llm::{LlmClient, LlmRequest};
use meridian_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Routing replies are a single word.
const ROUTE_MAX_TOKENS: u32 = 8;

pub struct QueryRouter {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    index: Arc<KnowledgeIndex>,
    timeout: Duration,
    temperature: f32,
}

impl QueryRouter {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        index: Arc<KnowledgeIndex>,
        timeout: Duration,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
            index,
            timeout,
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Decide which sources to consult for `query`. Never fails.
    pub async fn route(&self, query: &str) -> RoutingDecision {
        match self.ask_oracle(query).await {
            Ok(route) => {
                tracing::info!(route = %route, "Query routed by oracle");
                RoutingDecision {
                    route,
                    source: DecisionSource::Oracle,
                    rationale: format!("Classified as {} by {}", route, self.llm.provider_name()),
                }
            }
            Err(e) => {
                let decision = self.fallback(&e).await;
                tracing::warn!(
                    route = %decision.route,
                    error = %e,
                    "Routing oracle failed, using fallback"
                );
                decision
            }
        }
    }

    async fn ask_oracle(&self, query: &str) -> AppResult<Route> {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        let sources: Vec<String> = self
            .index
            .source_names()
            .await
            .iter()
            .map(|name| SourceType::Document.citation_tag(name))
            .collect();
        variables.insert("sources".to_string(), sources.join(", "));

        let built = build_prompt(&self.prompt, &variables)?;
        let mut request = LlmRequest::new(built.user, self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(ROUTE_MAX_TOKENS);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = tokio::time::timeout(self.timeout, self.llm.complete(&request))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "Routing oracle did not answer within {}ms",
                    self.timeout.as_millis()
                ))
            })??;

        Route::parse_label(&response.content).ok_or_else(|| {
            AppError::Llm(format!(
                "Unrecognized routing label: {:?}",
                response.content.trim()
            ))
        })
    }

    /// Empty index: only the web can help. Otherwise consult both.
    async fn fallback(&self, cause: &AppError) -> RoutingDecision {
        let (route, reason) = if self.index.is_empty().await {
            (Route::Web, "document index is empty")
        } else {
            (Route::Hybrid, "ambiguous query, consulting all sources")
        };

        RoutingDecision {
            route,
            source: DecisionSource::Fallback,
            rationale: format!("Fallback to {} ({}): {}", route, reason, cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TrigramProvider;
    use crate::types::Chunk;
    use meridian_llm::LlmResponse;
    use meridian_prompt::builtin;

    struct FixedReply(AppResult<&'static str>, Duration);

    #[async_trait::async_trait]
    impl LlmClient for FixedReply {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            tokio::time::sleep(self.1).await;
            match &self.0 {
                Ok(text) => Ok(LlmResponse::text(*text, &request.model)),
                Err(_) => Err(AppError::Llm("connection refused".to_string())),
            }
        }
    }

    async fn router(reply: AppResult<&'static str>, delay: Duration, indexed: bool) -> QueryRouter {
        let index = Arc::new(KnowledgeIndex::new(Arc::new(TrigramProvider::new(64))));
        if indexed {
            index
                .rebuild(vec![Chunk::new("notes.txt", 0, "notes about X")])
                .await
                .unwrap();
        }

        QueryRouter::new(
            Arc::new(FixedReply(reply, delay)),
            "test-model",
            builtin::get(builtin::ROUTE_PROMPT_ID).unwrap(),
            index,
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_oracle_label_is_used() {
        let decision = router(Ok(" hybrid\n"), Duration::ZERO, false).await.route("q").await;
        assert_eq!(decision.route, Route::Hybrid);
        assert_eq!(decision.source, DecisionSource::Oracle);
    }

    #[tokio::test]
    async fn test_free_text_falls_back_to_web_on_empty_index() {
        let decision = router(Ok("It depends."), Duration::ZERO, false).await.route("q").await;
        assert_eq!(decision.route, Route::Web);
        assert_eq!(decision.source, DecisionSource::Fallback);
    }

    #[tokio::test]
    async fn test_error_falls_back_to_hybrid_with_documents() {
        let decision = router(Err(AppError::Other(String::new())), Duration::ZERO, true)
            .await
            .route("q")
            .await;
        assert_eq!(decision.route, Route::Hybrid);
        assert_eq!(decision.source, DecisionSource::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let decision = router(Ok("DOC"), Duration::from_secs(60), false).await.route("q").await;
        assert_eq!(decision.route, Route::Web);
        assert!(decision.rationale.contains("did not answer"));
    }
}
