//! Web evidence types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ranked search result.
///
/// Snippets live for a single query turn. They are never indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSnippet {
    /// Page title as reported by the provider
    pub title: String,

    /// Canonical URL, used as the citation source
    pub url: String,

    /// Extracted snippet text
    pub text: String,

    /// When the provider returned this result
    pub retrieved_at: DateTime<Utc>,
}

impl WebSnippet {
    /// Create a snippet stamped with the current time.
    pub fn new(title: impl Into<String>, url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            text: text.into(),
            retrieved_at: Utc::now(),
        }
    }
}
