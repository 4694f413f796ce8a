//! LLM provider factory.
//!
//! Builds an `LlmClient` from a provider name, resolving the default
//! endpoint for each provider and rejecting missing credentials up front.

use crate::client::LlmClient;
use crate::providers::openai::{GROQ_BASE_URL, OPENAI_BASE_URL};
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai", "groq")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by hosted providers
/// * `timeout` - Transport timeout applied to every request
///
/// # Errors
/// Returns a message if the provider is unknown, a required key is
/// missing, or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_timeout(base_url, timeout)))
        }
        ProviderType::OpenAI | ProviderType::Groq => {
            let api_key = api_key.ok_or_else(|| {
                format!("{} provider requires API key", provider_type.as_str())
            })?;

            let default_url = if provider_type == ProviderType::Groq {
                GROQ_BASE_URL
            } else {
                OPENAI_BASE_URL
            };

            let client = OpenAiClient::new(
                provider_type.as_str(),
                endpoint.unwrap_or(default_url),
                api_key,
                timeout,
            )
            .map_err(|e| e.to_string())?;

            Ok(Arc::new(client))
        }
    }
}
