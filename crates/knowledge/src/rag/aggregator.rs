//! Evidence aggregation: fan-out retrieval, merge, and budget packing.

use crate::index::KnowledgeIndex;
use crate::rag::types::{ContextBundle, EvidenceRecord, IntoEvidence, Route, RoutingDecision};
use crate::types::SourceType;
use meridian_core::{AppConfig, AppResult, EvidenceOrder};
use meridian_web::WebEvidenceFetcher;
use std::collections::HashMap;
use std::sync::Arc;

/// Separator between folded texts sharing one citation label.
const FOLD_SEPARATOR: &str = "\n\n";

/// Retrieval and packing limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorSettings {
    /// Chunks requested from the vector index
    pub top_k: usize,
    /// Snippets requested from the web provider
    pub web_results: usize,
    /// Context budget in characters
    pub budget_chars: usize,
    pub order: EvidenceOrder,
}

impl AggregatorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.rag.top_k,
            web_results: config.web.max_results,
            budget_chars: config.rag.context_budget_chars,
            order: config.rag.evidence_order,
        }
    }
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct EvidenceAggregator {
    index: Arc<KnowledgeIndex>,
    web: WebEvidenceFetcher,
    settings: AggregatorSettings,
}

impl EvidenceAggregator {
    pub fn new(
        index: Arc<KnowledgeIndex>,
        web: WebEvidenceFetcher,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            index,
            web,
            settings,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Retrieve evidence per `decision` and pack it into a bounded bundle.
    ///
    /// Only configuration errors escape. A failed document search or web
    /// fetch contributes no evidence and the other source still counts.
    /// An empty bundle is a normal result.
    pub async fn assemble(
        &self,
        decision: &RoutingDecision,
        query: &str,
    ) -> AppResult<ContextBundle> {
        let (documents, web) = match decision.route {
            Route::Document => (self.search_documents(query).await?, Vec::new()),
            Route::Web => (Vec::new(), self.fetch_web(query).await),
            Route::Hybrid => {
                let (documents, web) =
                    tokio::join!(self.search_documents(query), self.fetch_web(query));
                (documents?, web)
            }
        };

        tracing::debug!(
            documents = documents.len(),
            web = web.len(),
            order = ?self.settings.order,
            "Merging evidence"
        );

        let merged = merge(documents, web, self.settings.order);
        let bundle = pack(merged, self.settings.budget_chars);

        tracing::info!(
            records = bundle.len(),
            used = bundle.used,
            budget = bundle.budget,
            "Assembled context"
        );

        Ok(bundle)
    }

    async fn search_documents(&self, query: &str) -> AppResult<Vec<EvidenceRecord>> {
        match self.index.search(query, self.settings.top_k).await {
            Ok(hits) => Ok(to_evidence(hits, SourceType::Document)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Document search failed, continuing without document evidence");
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_web(&self, query: &str) -> Vec<EvidenceRecord> {
        let snippets = self.web.fetch(query, self.settings.web_results).await;
        to_evidence(snippets, SourceType::Web)
    }
}

/// Convert retrieval results, warning about any that cannot become evidence.
fn to_evidence<T: IntoEvidence>(items: Vec<T>, kind: SourceType) -> Vec<EvidenceRecord> {
    let total = items.len();
    let records: Vec<EvidenceRecord> = items
        .into_iter()
        .filter_map(IntoEvidence::into_evidence)
        .collect();

    if records.len() < total {
        tracing::warn!(
            source = ?kind,
            dropped = total - records.len(),
            "Dropped results with a blank source tag or blank text"
        );
    }
    records
}

/// Merge ranked document and web evidence.
pub fn merge(
    documents: Vec<EvidenceRecord>,
    web: Vec<EvidenceRecord>,
    order: EvidenceOrder,
) -> Vec<EvidenceRecord> {
    match order {
        EvidenceOrder::DocumentsFirst => documents.into_iter().chain(web).collect(),
        EvidenceOrder::WebFirst => web.into_iter().chain(documents).collect(),
        EvidenceOrder::Interleaved => {
            let mut merged = Vec::with_capacity(documents.len() + web.len());
            let mut documents = documents.into_iter();
            let mut web = web.into_iter();
            loop {
                match (documents.next(), web.next()) {
                    (None, None) => break,
                    (doc, hit) => merged.extend(doc.into_iter().chain(hit)),
                }
            }
            merged
        }
    }
}

/// Greedy rank-order packing under a character budget.
///
/// Records sharing a citation label are folded into the first one, so each
/// label appears once per source type; the separator counts against the
/// budget. Packing stops at the first record that does not fit, and records
/// are never cut.
pub fn pack(records: Vec<EvidenceRecord>, budget: usize) -> ContextBundle {
    let mut bundle = ContextBundle::empty(budget);
    let mut slots: HashMap<(SourceType, String), usize> = HashMap::new();
    let separator_len = FOLD_SEPARATOR.chars().count();

    for record in records {
        let key = (record.kind, record.citation_label.clone());

        match slots.get(&key) {
            Some(&slot) => {
                let cost = separator_len + record.len();
                if bundle.used + cost > budget {
                    break;
                }
                let existing = &mut bundle.records[slot];
                existing.text.push_str(FOLD_SEPARATOR);
                existing.text.push_str(&record.text);
                existing.score = match (existing.score, record.score) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    (a, b) => a.or(b),
                };
                bundle.used += cost;
            }
            None => {
                let cost = record.len();
                if bundle.used + cost > budget {
                    break;
                }
                slots.insert(key, bundle.records.len());
                bundle.used += cost;
                bundle.records.push(record);
            }
        }
    }

    bundle
}
