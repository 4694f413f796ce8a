//! Hybrid document and web question answering.
//!
//! A query flows through [`QueryRouter`] (which sources), then
//! [`EvidenceAggregator`] (retrieve, merge, pack), then
//! [`AnswerSynthesizer`] (grounded answer with verified citations).

pub mod aggregator;
pub mod pipeline;
pub mod router;
pub mod synthesizer;
pub mod types;

pub use aggregator::{merge, pack, AggregatorSettings, EvidenceAggregator};
pub use pipeline::RagPipeline;
pub use router::QueryRouter;
pub use synthesizer::{extract_citations, verify, AnswerSynthesizer};
pub use types::{
    citation_label, Answer, ContextBundle, DecisionSource, EvidenceRecord, IntoEvidence,
    RagOutcome, Route, RoutingDecision, INSUFFICIENT_EVIDENCE_ANSWER,
};
