//! Text chunking with configurable size and overlap.

use crate::types::Chunk;
use meridian_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};

/// Split a document into position-tagged chunks.
///
/// Sizes are measured in characters. The splitter prefers semantic
/// boundaries (paragraphs, sentences, words) and never cuts inside a
/// character. Whitespace-only pieces are dropped without consuming a
/// position.
pub fn chunk_document(
    source_name: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> AppResult<Vec<Chunk>> {
    let config = ChunkConfig::new(chunk_size)
        .with_overlap(overlap)
        .map_err(|e| AppError::Config(format!("Invalid chunk settings: {}", e)))?;
    let splitter = TextSplitter::new(config);

    let chunks: Vec<Chunk> = splitter
        .chunks(text)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(position, piece)| Chunk::new(source_name, position as u32, piece))
        .collect();

    tracing::debug!(
        source = source_name,
        chunks = chunks.len(),
        chunk_size,
        overlap,
        "Chunked document"
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_document_basic() {
        let text = "This is a sentence about retrieval. ".repeat(100);
        let chunks = chunk_document("notes.txt", &text, 200, 50).unwrap();

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.position, i as u32);
            assert_eq!(chunk.source_name, "notes.txt");
            assert!(chunk.text.chars().count() <= 200);
        }
    }

    #[test]
    fn test_chunk_document_short_text_single_chunk() {
        let chunks = chunk_document("a.md", "Short note.", 800, 100).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Short note.");
    }

    #[test]
    fn test_chunk_document_empty() {
        assert!(chunk_document("a.md", "   \n\n  ", 800, 100).unwrap().is_empty());
    }

    #[test]
    fn test_chunk_document_utf8() {
        let text = "Gamedex é um aplicativo 🎮 com acentuação: ã, õ, ç. ".repeat(50);
        let chunks = chunk_document("pt.txt", &text, 120, 20).unwrap();
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_overlap_not_smaller_than_size_is_config_error() {
        let result = chunk_document("a.md", "text", 100, 100);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
