//! Tavily search provider.
//!
//! Tavily API: https://docs.tavily.com/documentation/api-reference/endpoint/search

use crate::provider::WebSearchProvider;
use crate::types::WebSnippet;
use meridian_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TAVILY_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Client for the Tavily search API.
pub struct TavilyClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TavilyClient {
    /// Create a client. `timeout` is a transport-level ceiling; the fetcher
    /// applies its own deadline on top.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn convert_response(response: SearchResponse, max_results: usize) -> Vec<WebSnippet> {
        response
            .results
            .into_iter()
            .filter(|result| !result.url.trim().is_empty())
            .take(max_results)
            .map(|result| WebSnippet::new(result.title, result.url.trim(), result.content))
            .collect()
    }
}

#[async_trait::async_trait]
impl WebSearchProvider for TavilyClient {
    fn provider_name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<WebSnippet>> {
        tracing::debug!(max_results, "Sending Tavily search");

        let url = format!("{}/search", self.base_url);
        let body = SearchRequest {
            api_key: self.api_key.trim(),
            query,
            max_results,
            search_depth: "basic",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!("Tavily request timed out: {}", e))
                } else {
                    AppError::Web(format!("Failed to send request to Tavily: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::Web(format!(
                "Tavily API error ({}): {}",
                status, error_text
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Web(format!("Failed to parse Tavily response: {}", e)))?;

        Ok(Self::convert_response(parsed, max_results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_response_keeps_provider_order() {
        let raw = r#"{
            "query": "rust release",
            "results": [
                {"title": "A", "url": "https://example.com/a", "content": "first", "score": 0.4},
                {"title": "B", "url": "https://example.com/b", "content": "second", "score": 0.9}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();

        let snippets = TavilyClient::convert_response(parsed, 3);
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].url, "https://example.com/a");
        assert_eq!(snippets[1].text, "second");
    }

    #[test]
    fn test_convert_response_drops_missing_urls_and_caps() {
        let raw = r#"{"results": [
            {"title": "no url", "content": "x"},
            {"title": "A", "url": " https://example.com/a ", "content": "a"},
            {"title": "B", "url": "https://example.com/b", "content": "b"}
        ]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();

        let snippets = TavilyClient::convert_response(parsed, 1);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].url, "https://example.com/a");
    }

    #[test]
    fn test_request_serialization() {
        let body = SearchRequest {
            api_key: "tvly-test",
            query: "today's news",
            max_results: 3,
            search_depth: "basic",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["query"], "today's news");
        assert_eq!(json["max_results"], 3);
    }

    #[test]
    fn test_base_url_trimmed() {
        let client = TavilyClient::new("https://api.tavily.com/", "k", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, TAVILY_BASE_URL);
        assert_eq!(client.provider_name(), "tavily");
    }
}
