//! Web evidence fetcher: a deadline and a degrade-to-empty policy around a provider.

use crate::provider::WebSearchProvider;
use crate::types::WebSnippet;
use std::sync::Arc;
use std::time::Duration;

/// Fetches web snippets for one query.
///
/// `fetch` never fails. A disabled fetcher, a provider error and an expired
/// deadline all produce an empty result.
#[derive(Clone)]
pub struct WebEvidenceFetcher {
    provider: Option<Arc<dyn WebSearchProvider>>,
    timeout: Duration,
}

impl WebEvidenceFetcher {
    pub fn new(provider: Arc<dyn WebSearchProvider>, timeout: Duration) -> Self {
        Self {
            provider: Some(provider),
            timeout,
        }
    }

    /// A fetcher that never calls out and always returns nothing.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Fetch up to `max_results` snippets in provider rank order.
    pub async fn fetch(&self, query: &str, max_results: usize) -> Vec<WebSnippet> {
        let Some(provider) = self.provider.as_ref() else {
            tracing::debug!("Web search disabled, skipping fetch");
            return Vec::new();
        };

        if max_results == 0 {
            return Vec::new();
        }

        match tokio::time::timeout(self.timeout, provider.search(query, max_results)).await {
            Ok(Ok(mut snippets)) => {
                snippets.truncate(max_results);
                tracing::info!(
                    provider = provider.provider_name(),
                    count = snippets.len(),
                    "Fetched web evidence"
                );
                snippets
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = provider.provider_name(),
                    error = %e,
                    "Web search failed, continuing without web evidence"
                );
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    provider = provider.provider_name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Web search timed out, continuing without web evidence"
                );
                Vec::new()
            }
        }
    }
}
