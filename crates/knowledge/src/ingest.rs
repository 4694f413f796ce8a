//! Ingestion: files on disk to an embedded, rebuilt index.

use crate::cancel::CancellationToken;
use crate::chunker::chunk_document;
use crate::index::KnowledgeIndex;
use crate::parser;
use crate::types::{Chunk, LearnOptions, LearnStats};
use chrono::Utc;
use meridian_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Chunks embedded per provider call.
const EMBED_BATCH_SIZE: usize = 32;

/// Ingest `options.paths` and rebuild `index` from scratch.
///
/// Unreadable or binary files are skipped with a warning. Cancellation is
/// checked between files and between embedding batches; a cancelled run
/// leaves the index as it was.
pub async fn learn(
    index: &KnowledgeIndex,
    options: &LearnOptions,
    cancel: &CancellationToken,
) -> AppResult<LearnStats> {
    let start = Instant::now();
    let files = collect_files(options)?;

    tracing::info!(files = files.len(), "Starting ingestion");

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut sources = 0u32;
    let mut skipped = 0u32;
    let mut bytes = 0u64;

    for path in &files {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        match process_file(path, options) {
            Ok((file_chunks, size)) if !file_chunks.is_empty() => {
                sources += 1;
                bytes += size;
                chunks.extend(file_chunks);
            }
            Ok(_) => {
                tracing::debug!("Skipping empty file: {:?}", path);
                skipped += 1;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                skipped += 1;
            }
        }
    }

    let embedder = index.embedder();
    for batch in chunks.chunks_mut(EMBED_BATCH_SIZE) {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        for (chunk, embedding) in batch.iter_mut().zip(embeddings) {
            chunk.embedding = Some(embedding);
        }
    }

    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    let indexed = index.rebuild(chunks).await?;

    let duration = start.elapsed();
    tracing::info!(
        "Ingestion completed: {} sources, {} chunks, {} bytes in {:.2}s",
        sources,
        indexed,
        bytes,
        duration.as_secs_f64()
    );

    Ok(LearnStats {
        sources,
        skipped,
        chunks: indexed as u32,
        bytes,
        duration,
        learned_at: Utc::now(),
    })
}

fn process_file(path: &Path, options: &LearnOptions) -> AppResult<(Vec<Chunk>, u64)> {
    let text = parser::parse_file(path)?;
    let source_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let chunks = chunk_document(&source_name, &text, options.chunk_size, options.chunk_overlap)?;
    Ok((chunks, text.len() as u64))
}

/// Expand paths into a sorted, de-duplicated file list.
fn collect_files(options: &LearnOptions) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in &options.paths {
        if path.is_file() {
            if should_include(path, options) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && should_include(entry_path, options) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else {
            return Err(AppError::Config(format!("Path does not exist: {:?}", path)));
        }
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|p| seen.insert(p.clone()));
    Ok(files)
}

/// Check if a file should be included based on patterns.
fn should_include(path: &Path, options: &LearnOptions) -> bool {
    let path_str = path.to_string_lossy();

    if options.exclude.iter().any(|pattern| path_str.contains(pattern.as_str())) {
        return false;
    }

    options.include.is_empty()
        || options
            .include
            .iter()
            .any(|pattern| path_str.contains(pattern.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TrigramProvider;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn options(paths: Vec<PathBuf>) -> LearnOptions {
        LearnOptions {
            paths,
            chunk_size: 800,
            chunk_overlap: 100,
            ..LearnOptions::default()
        }
    }

    fn index() -> KnowledgeIndex {
        KnowledgeIndex::new(Arc::new(TrigramProvider::new(384)))
    }

    #[tokio::test]
    async fn test_learn_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "Quarterly revenue grew by ten percent.").unwrap();
        fs::write(dir.path().join("guide.md"), "# Guide\n\nDeploy with the blue pipeline.").unwrap();
        fs::write(dir.path().join("blob.bin"), b"\x00\x01\x02").unwrap();

        let index = index();
        let stats = learn(&index, &options(vec![dir.path().to_path_buf()]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(stats.sources, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.chunks, 2);
        assert_eq!(index.source_names().await, vec!["guide.md", "notes.txt"]);
    }

    #[tokio::test]
    async fn test_learn_reads_pdf_and_skips_broken_pdf() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("report.pdf"),
            crate::parser::tests::minimal_pdf("Invoices are kept for seven years"),
        )
        .unwrap();
        fs::write(dir.path().join("scan.pdf"), b"not a pdf at all").unwrap();

        let index = index();
        let stats = learn(&index, &options(vec![dir.path().to_path_buf()]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(stats.sources, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(index.source_names().await, vec!["report.pdf"]);
    }

    #[tokio::test]
    async fn test_learn_respects_filters() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("keep.md"), "keep me").unwrap();
        fs::write(dir.path().join("skip.txt"), "not markdown").unwrap();
        fs::write(dir.path().join("drafts/wip.md"), "draft").unwrap();

        let mut opts = options(vec![dir.path().to_path_buf()]);
        opts.include = vec![".md".to_string()];
        opts.exclude = vec!["drafts".to_string()];

        let index = index();
        learn(&index, &opts, &CancellationToken::new()).await.unwrap();
        assert_eq!(index.source_names().await, vec!["keep.md"]);
    }

    #[tokio::test]
    async fn test_missing_path_is_config_error() {
        let opts = options(vec![PathBuf::from("/definitely/not/here")]);
        let result = learn(&index(), &opts, &CancellationToken::new()).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_cancelled_learn_leaves_index_untouched() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "content").unwrap();

        let token = CancellationToken::new();
        token.cancel();

        let index = index();
        let result = learn(&index, &options(vec![dir.path().to_path_buf()]), &token).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert!(index.is_empty().await);
    }
}
