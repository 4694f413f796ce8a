//! Web search provider trait.

use crate::types::WebSnippet;
use meridian_core::AppResult;

/// A live web search API.
///
/// Implementations return results in the provider's own ranking. Timeouts
/// and error recovery are the fetcher's job, not the provider's.
#[async_trait::async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Provider name for logging.
    fn provider_name(&self) -> &str;

    /// Search the web for `query`, returning at most `max_results` snippets.
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<WebSnippet>>;
}
