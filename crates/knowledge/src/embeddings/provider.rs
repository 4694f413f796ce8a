//! Embedding provider trait and factory.

use meridian_core::{AppError, AppResult, EmbeddingConfig};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts, one vector per text, in order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Fail fast when a vector does not match the provider's dimensionality.
///
/// Mixing embedding spaces would silently produce meaningless rankings, so a
/// mismatch is a configuration error.
pub fn check_dimensions(provider: &dyn EmbeddingProvider, vector: &[f32]) -> AppResult<()> {
    if vector.len() != provider.dimensions() {
        return Err(AppError::Config(format!(
            "Embedding dimension mismatch: {} model '{}' is configured for {} dimensions but produced {}",
            provider.provider_name(),
            provider.model_name(),
            provider.dimensions(),
            vector.len()
        )));
    }
    Ok(())
}

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    match config.provider.as_str() {
        "trigram" => Ok(Arc::new(super::TrigramProvider::new(config.dimensions))),

        "ollama" => {
            let provider = super::OllamaEmbedder::new(
                config.endpoint.as_deref(),
                &config.model,
                config.dimensions,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            config.provider
        ))),
    }
}
