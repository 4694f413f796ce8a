//! Retrieval core for Meridian.
//!
//! Holds the session-scoped document index (chunking, embeddings,
//! nearest-neighbor search) and the RAG pipeline that routes each query to
//! documents, the web or both, fuses the evidence under a context budget and
//! synthesizes an answer with verified citations.

pub mod cancel;
pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod parser;
pub mod rag;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::KnowledgeIndex;
pub use ingest::learn;
pub use rag::{
    Answer, ContextBundle, EvidenceRecord, RagOutcome, RagPipeline, Route, RoutingDecision,
};
pub use types::{Chunk, LearnOptions, LearnStats, ScoredChunk, SourceType};
pub use vector_index::{FlatIndex, NearestNeighbor};
