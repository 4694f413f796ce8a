//! Embedding functions.
//!
//! The same provider embeds chunks at ingestion and queries at search time;
//! every vector it produces is checked against its declared dimensions.

pub mod provider;
pub mod providers;

pub use provider::{check_dimensions, create_provider, EmbeddingProvider};
pub use providers::{OllamaEmbedder, TrigramProvider};
