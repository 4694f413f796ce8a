//! RAG core types.

use crate::types::{ScoredChunk, SourceType};
use meridian_web::WebSnippet;
use serde::Serialize;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

/// Which sources a query consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Route {
    Document,
    Web,
    Hybrid,
}

impl Route {
    /// Parse an oracle reply: exactly one of `DOC`, `WEB`, `HYBRID` after
    /// trimming whitespace, any case, with at most one trailing period.
    pub fn parse_label(reply: &str) -> Option<Self> {
        let reply = reply.trim();
        let label = reply.strip_suffix('.').unwrap_or(reply);
        if label.eq_ignore_ascii_case("DOC") {
            Some(Self::Document)
        } else if label.eq_ignore_ascii_case("WEB") {
            Some(Self::Web)
        } else if label.eq_ignore_ascii_case("HYBRID") {
            Some(Self::Hybrid)
        } else {
            None
        }
    }

    pub fn uses_documents(&self) -> bool {
        matches!(self, Self::Document | Self::Hybrid)
    }

    pub fn uses_web(&self) -> bool {
        matches!(self, Self::Web | Self::Hybrid)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Document => "DOCUMENT",
            Self::Web => "WEB",
            Self::Hybrid => "HYBRID",
        })
    }
}

/// How a routing decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The language model classified the query
    Oracle,
    /// The oracle failed and the deterministic heuristic decided
    Fallback,
}

/// The router's verdict for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingDecision {
    pub route: Route,
    pub source: DecisionSource,
    /// Human-readable reason, for logs and the CLI
    pub rationale: String,
}

/// Evidence normalized from any source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceRecord {
    pub kind: SourceType,

    /// File name for documents, URL for web results
    pub source_tag: String,

    pub text: String,

    /// `Doc: <source_name>` or `Web: <url>`, without brackets
    pub citation_label: String,

    /// Similarity score for documents; web results carry provider rank only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,

    /// Web page title, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl EvidenceRecord {
    /// Build a record, or `None` when the tag or the text is blank.
    ///
    /// The tag is rewritten with [`SourceType::citation_tag`] so the label
    /// always forms a parseable citation.
    pub fn new(
        kind: SourceType,
        source_tag: &str,
        text: impl Into<String>,
        score: Option<f32>,
    ) -> Option<Self> {
        let source_tag = kind.citation_tag(source_tag);
        let text = text.into();

        if source_tag.is_empty() || text.trim().is_empty() {
            return None;
        }

        Some(Self {
            kind,
            citation_label: citation_label(kind, &source_tag),
            source_tag,
            text,
            score,
            title: None,
        })
    }

    /// Size counted against the context budget.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bracketed citation exactly as the model must write it.
    pub fn citation(&self) -> String {
        format!("[{}]", self.citation_label)
    }

    /// First `max` graphemes of the text, with an ellipsis when cut.
    pub fn preview(&self, max: usize) -> String {
        let flat = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut graphemes = flat.graphemes(true);
        let head: String = graphemes.by_ref().take(max).collect();
        if graphemes.next().is_some() {
            format!("{}…", head)
        } else {
            head
        }
    }
}

/// Citation label for a source: `Doc: notes.txt`, `Web: https://…`.
pub fn citation_label(kind: SourceType, source_tag: &str) -> String {
    format!("{}: {}", kind.label_prefix(), kind.citation_tag(source_tag))
}

/// Conversion of a source-specific result into an [`EvidenceRecord`].
pub trait IntoEvidence {
    fn into_evidence(self) -> Option<EvidenceRecord>;
}

impl IntoEvidence for ScoredChunk {
    fn into_evidence(self) -> Option<EvidenceRecord> {
        EvidenceRecord::new(
            SourceType::Document,
            &self.chunk.source_name,
            self.chunk.text,
            Some(self.score),
        )
    }
}

impl IntoEvidence for WebSnippet {
    fn into_evidence(self) -> Option<EvidenceRecord> {
        let title = Some(self.title).filter(|t| !t.trim().is_empty());
        EvidenceRecord::new(SourceType::Web, &self.url, self.text, None).map(|record| {
            EvidenceRecord { title, ..record }
        })
    }
}

/// Ordered, budget-bounded evidence for one synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextBundle {
    pub records: Vec<EvidenceRecord>,

    /// Maximum total record length in characters
    pub budget: usize,

    /// Total record length actually used
    pub used: usize,
}

impl ContextBundle {
    pub fn empty(budget: usize) -> Self {
        Self {
            records: Vec::new(),
            budget,
            used: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.records.iter().any(|r| r.citation_label == label)
    }

    pub fn records_of(&self, kind: SourceType) -> impl Iterator<Item = &EvidenceRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    /// Evidence blocks for the answer prompt: `[<label>]` then the text.
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{}\n{}", record.citation(), record.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A synthesized answer with verified citations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,

    /// Labels cited in `text` that exist in the bundle, in order of first use
    pub citations: Vec<String>,

    /// Labels cited in `text` that do not exist in the bundle
    pub unverified_citations: Vec<String>,

    /// True when no evidence was available and the model was not called
    pub insufficient_evidence: bool,
}

/// Fixed reply when there is no evidence at all.
pub const INSUFFICIENT_EVIDENCE_ANSWER: &str =
    "There is insufficient evidence to answer this question: no relevant documents or web results were found.";

impl Answer {
    pub fn insufficient_evidence() -> Self {
        Self {
            text: INSUFFICIENT_EVIDENCE_ANSWER.to_string(),
            citations: Vec::new(),
            unverified_citations: Vec::new(),
            insufficient_evidence: true,
        }
    }

    /// True when every citation in the text was found in the evidence.
    pub fn is_verified(&self) -> bool {
        self.unverified_citations.is_empty()
    }

    pub fn has_unverified_citations(&self) -> bool {
        !self.is_verified()
    }
}

/// Everything one query turn produced.
#[derive(Debug, Clone, Serialize)]
pub struct RagOutcome {
    pub decision: RoutingDecision,
    pub bundle: ContextBundle,
    pub answer: Answer,
}
