//! Answer synthesis with post-generation citation verification.

use crate::rag::types::{Answer, ContextBundle};
use meridian_core::{AppError, AppResult};
use meridian_llm::{LlmClient, LlmRequest};
use meridian_prompt::{build_prompt, PromptDefinition};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// Any bracketed `Doc:` or `Web:` token. Only the exact `Doc: <source_name>`
/// and `Web: <url>` forms can match a bundle label; every other spacing is
/// kept verbatim and ends up unverified.
static CITATION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[((?:Doc|Web):[^\[\]\n]*)\]").ok());

const ANSWER_MAX_TOKENS: u32 = 1024;

pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    timeout: Duration,
    temperature: f32,
}

impl AnswerSynthesizer {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        timeout: Duration,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            prompt,
            timeout,
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generate a grounded answer from `bundle`.
    ///
    /// An empty bundle short-circuits to the fixed insufficient-evidence
    /// answer without calling the model. Model errors and timeouts are
    /// returned to the caller.
    pub async fn generate(&self, query: &str, bundle: &ContextBundle) -> AppResult<Answer> {
        if bundle.is_empty() {
            tracing::info!("No evidence available, skipping synthesis");
            return Ok(Answer::insufficient_evidence());
        }

        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        variables.insert("context".to_string(), bundle.render());

        let built = build_prompt(&self.prompt, &variables)?;
        let mut request = LlmRequest::new(built.user, self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(ANSWER_MAX_TOKENS);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = tokio::time::timeout(self.timeout, self.llm.complete(&request))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "Answer synthesis did not finish within {}s",
                    self.timeout.as_secs_f64()
                ))
            })??;

        let answer = verify(response.content.trim().to_string(), bundle);

        if answer.has_unverified_citations() {
            tracing::warn!(
                unverified = ?answer.unverified_citations,
                "Answer cites sources that are not in the evidence"
            );
        }
        tracing::info!(
            citations = answer.citations.len(),
            tokens = response.usage.total_tokens,
            "Answer synthesized"
        );

        Ok(answer)
    }
}

/// Labels cited in `text`, exactly as written between the brackets, in order of first use.
pub fn extract_citations(text: &str) -> Vec<String> {
    let Some(re) = CITATION_RE.as_ref() else {
        return Vec::new();
    };

    let mut labels: Vec<String> = Vec::new();
    for caps in re.captures_iter(text) {
        let label = caps[1].to_string();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Split the citations in `text` into verified and unverified against `bundle`.
pub fn verify(text: String, bundle: &ContextBundle) -> Answer {
    let (citations, unverified_citations): (Vec<String>, Vec<String>) = extract_citations(&text)
        .into_iter()
        .partition(|label| bundle.contains_label(label));

    Answer {
        text,
        citations,
        unverified_citations,
        insufficient_evidence: false,
    }
}
