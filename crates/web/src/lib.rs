//! Live web evidence for Meridian.
//!
//! A [`WebSearchProvider`] wraps one search API. The [`WebEvidenceFetcher`]
//! puts a timeout around it and turns every failure into "no web evidence",
//! so a broken provider can never abort a query.

pub mod factory;
pub mod fetcher;
pub mod provider;
pub mod providers;
pub mod types;

pub use factory::{build_fetcher, create_provider};
pub use fetcher::WebEvidenceFetcher;
pub use provider::WebSearchProvider;
pub use providers::TavilyClient;
pub use types::WebSnippet;
