//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::Duration;

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Document,
    Web,
}

impl SourceType {
    /// Prefix used in citation labels: `Doc` or `Web`.
    pub fn label_prefix(&self) -> &'static str {
        match self {
            Self::Document => "Doc",
            Self::Web => "Web",
        }
    }

    /// Rewrite a source name or URL so it can sit inside a `[...]` citation.
    ///
    /// URLs get RFC 3986 percent-escapes for brackets. File names get
    /// parentheses instead. Control characters become spaces and the result
    /// is trimmed.
    pub fn citation_tag(&self, raw: &str) -> String {
        let mut tag = String::with_capacity(raw.len());
        for c in raw.chars() {
            match (self, c) {
                (Self::Web, '[') => tag.push_str("%5B"),
                (Self::Web, ']') => tag.push_str("%5D"),
                (Self::Document, '[') => tag.push('('),
                (Self::Document, ']') => tag.push(')'),
                (_, c) if c.is_control() => tag.push(' '),
                (_, c) => tag.push(c),
            }
        }
        tag.trim().to_string()
    }
}

/// A text chunk from an ingested document.
///
/// Chunks are immutable once created and live for the session that built
/// the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Content hash of `(source_name, position, text)`
    pub id: String,

    /// Text content
    pub text: String,

    /// File name of the source document, used for citations
    pub source_name: String,

    /// Always [`SourceType::Document`] for indexed chunks
    pub source_type: SourceType,

    /// Position within the source
    pub position: u32,

    /// Embedding vector, present once the chunk has been embedded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    pub fn new(source_name: impl Into<String>, position: u32, text: impl Into<String>) -> Self {
        let source_name = source_name.into();
        let text = text.into();
        let id = chunk_id(&source_name, position, &text);

        Self {
            id,
            text,
            source_name,
            source_type: SourceType::Document,
            position,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Stable chunk identifier.
fn chunk_id(source_name: &str, position: u32, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_name.as_bytes());
    hasher.update([0u8]);
    hasher.update(position.to_le_bytes());
    hasher.update(text.as_bytes());

    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// A chunk returned by a similarity search, nearest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,

    /// Cosine similarity to the query
    pub score: f32,
}

/// Options for the learn operation.
#[derive(Debug, Clone, Default)]
pub struct LearnOptions {
    /// Local files or directories to ingest
    pub paths: Vec<PathBuf>,

    /// Include patterns (substring match on the path)
    pub include: Vec<String>,

    /// Exclude patterns (substring match on the path)
    pub exclude: Vec<String>,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks
    pub chunk_overlap: usize,
}

/// Statistics from a learn operation.
#[derive(Debug, Clone, Serialize)]
pub struct LearnStats {
    /// Number of sources ingested
    pub sources: u32,

    /// Number of sources skipped (binary, unreadable, empty)
    pub skipped: u32,

    /// Number of chunks indexed
    pub chunks: u32,

    /// Total bytes of text processed
    pub bytes: u64,

    /// Wall-clock time of the operation
    pub duration: Duration,

    /// When the index was rebuilt
    pub learned_at: DateTime<Utc>,
}
