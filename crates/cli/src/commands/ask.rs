//! Ask command handler.
//!
//! Indexes the given paths into a fresh session, answers one question and
//! prints the answer with its routing decision and evidence.

use super::runtime::{cancel_on_ctrl_c, Session, SourceArgs};
use clap::Args;
use meridian_core::{config::AppConfig, AppError, AppResult};
use meridian_knowledge::{CancellationToken, LearnStats, RagOutcome, SourceType};

const PREVIEW_GRAPHEMES: usize = 160;

/// Answer one question from documents and/or the web
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let (session, stats) = Session::open(config, &self.sources, true).await?;

        let cancel = CancellationToken::new();
        let _guard = cancel_on_ctrl_c(&cancel);
        let outcome = session.pipeline().ask(&self.query, &cancel).await?;

        if self.json {
            print_json(&outcome, &stats)
        } else {
            print_outcome(&outcome);
            Ok(())
        }
    }
}

/// Answer, classification, then document and web evidence.
pub fn print_outcome(outcome: &RagOutcome) {
    println!("{}", outcome.answer.text);

    if outcome.answer.has_unverified_citations() {
        println!();
        println!(
            "Warning: cited sources not in the evidence: {}",
            outcome.answer.unverified_citations.join(", ")
        );
    }

    println!();
    println!(
        "Classification: {} ({:?}: {})",
        outcome.decision.route, outcome.decision.source, outcome.decision.rationale
    );

    for (heading, kind) in [
        ("Document evidence", SourceType::Document),
        ("Web evidence", SourceType::Web),
    ] {
        println!();
        println!("{}:", heading);
        let mut any = false;
        for record in outcome.bundle.records_of(kind) {
            any = true;
            match (record.score, &record.title) {
                (Some(score), _) => println!("  {} score {:.3}", record.citation(), score),
                (None, Some(title)) => println!("  {} {}", record.citation(), title),
                (None, None) => println!("  {}", record.citation()),
            }
            println!("    {}", record.preview(PREVIEW_GRAPHEMES));
        }
        if !any {
            println!("  (none)");
        }
    }
}

fn print_json(outcome: &RagOutcome, stats: &LearnStats) -> AppResult<()> {
    let output = serde_json::json!({
        "answer": outcome.answer,
        "decision": outcome.decision,
        "evidence": outcome.bundle,
        "index": stats,
    });

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
