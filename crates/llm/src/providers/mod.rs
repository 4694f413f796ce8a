//! Concrete LLM provider implementations.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use meridian_core::AppError;

/// Map a transport error to the error taxonomy, keeping timeouts distinct.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(format!("{} request timed out: {}", provider, err))
    } else {
        AppError::Llm(format!("Failed to send request to {}: {}", provider, err))
    }
}
