//! Source file parsing and text extraction.

use meridian_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Content type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Html,
    Code,
    PlainText,
    Pdf,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("md") | Some("markdown") => Self::Markdown,
            Some("html") | Some("htm") => Self::Html,
            Some("rs") | Some("py") | Some("js") | Some("ts") | Some("go") | Some("c")
            | Some("cpp") | Some("java") | Some("sh") | Some("yaml") | Some("yml")
            | Some("json") | Some("toml") => Self::Code,
            Some("txt") | Some("csv") | Some("log") => Self::PlainText,
            Some("pdf") => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Code => "code",
            Self::PlainText => "text",
            Self::Pdf => "pdf",
            Self::Unknown => "unknown",
        }
    }
}

/// Parse a source file and extract clean text.
///
/// Binary, non-UTF-8 and unreadable PDF files are rejected with a knowledge
/// error so the caller can skip them.
pub fn parse_file(path: &Path) -> AppResult<String> {
    if ContentType::from_path(path) == ContentType::Pdf {
        return parse_pdf(path);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    parse_text(ContentType::from_path(path), raw)
        .ok_or_else(|| AppError::Knowledge(format!("Binary file not supported: {:?}", path)))
}

fn parse_pdf(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    let text = extract_pdf_text(&bytes)
        .map_err(|reason| AppError::Knowledge(format!("Unreadable PDF {:?}: {}", path, reason)))?;

    Ok(text.trim().to_string())
}

/// `pdf-extract` panics on some malformed documents; those count as unreadable.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, String> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("malformed document".to_string()),
    }
}

fn parse_text(content_type: ContentType, raw: String) -> Option<String> {
    if raw.contains('\0') {
        return None;
    }

    let cleaned = match content_type {
        ContentType::Markdown => clean_markdown(&raw),
        ContentType::Html => clean_html(&raw),
        ContentType::Code | ContentType::PlainText | ContentType::Pdf | ContentType::Unknown => {
            raw
        }
    };

    Some(cleaned)
}

/// Strip heading markers and fences, keep prose.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if !trimmed.is_empty() {
            result.push_str(trimmed);
            result.push('\n');
        }
    }

    result.trim().to_string()
}

/// Strip tags along with script and style bodies, then collapse whitespace.
fn clean_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut skip_body = false;

    for (i, ch) in text.char_indices() {
        if ch == '<' {
            in_tag = true;

            let rest = &text[i..];
            if starts_with_ignore_case(rest, "<script") || starts_with_ignore_case(rest, "<style")
            {
                skip_body = true;
            } else if starts_with_ignore_case(rest, "</script")
                || starts_with_ignore_case(rest, "</style")
            {
                skip_body = false;
            }
        } else if ch == '>' {
            in_tag = false;
            result.push(' ');
        } else if !in_tag && !skip_body {
            result.push(ch);
        }
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
