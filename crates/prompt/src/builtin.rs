//! Built-in prompt definitions.
//!
//! The answer prompt carries the citation contract: labels must be written
//! exactly as `[Doc: <source_name>]` or `[Web: <url>]`, because citations are
//! verified against the evidence by pattern matching after generation.

use crate::types::{PromptDefinition, PromptOutputSpec};

/// Routing oracle prompt: classifies a query as DOC, WEB or HYBRID.
pub const ROUTE_PROMPT_ID: &str = "rag.route";

/// Grounded answer prompt with mandatory inline citations.
pub const ANSWER_PROMPT_ID: &str = "rag.answer";

const ROUTE_SYSTEM: &str = "You are a query router for a question answering system with two \
evidence sources: a local document index and live web search. You reply with a single label.";

const ROUTE_TEMPLATE: &str = "Classify this query into one of three categories: DOC, WEB, or HYBRID.
DOC: Internal knowledge, technical specs from documents.
WEB: Real-time news, current events, recent stats.
HYBRID: Comparing internal info with external trends.
{{#if sources}}
Indexed documents: {{sources}}
{{/if}}
Respond with exactly one of DOC, WEB or HYBRID and nothing else.

Query: {{query}}
Category:";

const ANSWER_SYSTEM: &str = "You are a research assistant that answers strictly from the supplied evidence.

Rules:
- Use only the evidence blocks provided by the user; do not rely on prior knowledge.
- Cite every factual claim with the label of the evidence block it comes from, written exactly as [Doc: filename] or [Web: URL].
- Only use labels that appear in the evidence. Never invent a label.
- If the evidence is empty or does not support an answer, state that there is insufficient evidence to answer the question.
- Keep the answer concise and factual.";

const ANSWER_TEMPLATE: &str = "Evidence:
{{context}}

Question: {{query}}
Answer:";

/// Look up a built-in prompt definition by ID.
pub fn get(id: &str) -> Option<PromptDefinition> {
    match id {
        ROUTE_PROMPT_ID => Some(definition(
            ROUTE_PROMPT_ID,
            "Query routing oracle",
            ROUTE_SYSTEM,
            ROUTE_TEMPLATE,
            "label",
        )),
        ANSWER_PROMPT_ID => Some(definition(
            ANSWER_PROMPT_ID,
            "Grounded answer with citations",
            ANSWER_SYSTEM,
            ANSWER_TEMPLATE,
            "text",
        )),
        _ => None,
    }
}

/// IDs of all built-in prompts.
pub fn ids() -> [&'static str; 2] {
    [ROUTE_PROMPT_ID, ANSWER_PROMPT_ID]
}

fn definition(id: &str, title: &str, system: &str, template: &str, format: &str) -> PromptDefinition {
    PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        created_by: "meridian".to_string(),
        system: Some(system.to_string()),
        template: template.to_string(),
        output: PromptOutputSpec {
            format: format.to_string(),
        },
    }
}
