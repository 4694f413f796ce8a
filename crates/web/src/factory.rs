//! Web provider factory.

use crate::fetcher::WebEvidenceFetcher;
use crate::provider::WebSearchProvider;
use crate::providers::tavily::{TavilyClient, TAVILY_BASE_URL};
use meridian_core::{AppError, AppResult, WebConfig};
use std::sync::Arc;
use std::time::Duration;

/// Create the configured web search provider.
///
/// # Errors
/// Returns a configuration error for an unknown provider or a missing key.
pub fn create_provider(
    config: &WebConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn WebSearchProvider>> {
    match config.provider.to_lowercase().as_str() {
        "tavily" => {
            let api_key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                AppError::Config(format!(
                    "Web search requires an API key in environment variable: {}",
                    config.api_key_env
                ))
            })?;

            let client = TavilyClient::new(
                config.endpoint.as_deref().unwrap_or(TAVILY_BASE_URL),
                api_key,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
        other => Err(AppError::Config(format!(
            "Unknown web search provider: {}. Supported: tavily",
            other
        ))),
    }
}

/// Build a fetcher from configuration; a disabled config yields a disabled fetcher.
pub fn build_fetcher(config: &WebConfig, api_key: Option<&str>) -> AppResult<WebEvidenceFetcher> {
    if !config.enabled {
        return Ok(WebEvidenceFetcher::disabled());
    }

    let provider = create_provider(config, api_key)?;
    Ok(WebEvidenceFetcher::new(
        provider,
        Duration::from_secs(config.timeout_secs),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tavily_provider() {
        let provider = create_provider(&WebConfig::default(), Some("tvly-test")).unwrap();
        assert_eq!(provider.provider_name(), "tavily");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = create_provider(&WebConfig::default(), Some("  "));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_unknown_provider() {
        let config = WebConfig {
            provider: "bing".to_string(),
            ..WebConfig::default()
        };
        let result = create_provider(&config, Some("k"));
        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("bing")));
    }

    #[test]
    fn test_disabled_config_needs_no_key() {
        let config = WebConfig {
            enabled: false,
            ..WebConfig::default()
        };
        let fetcher = build_fetcher(&config, None).unwrap();
        assert!(!fetcher.is_enabled());
    }
}
