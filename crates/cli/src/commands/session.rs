//! Session command handler.
//!
//! Builds the index once, then answers queries read line by line from stdin.
//! `:reload` re-indexes the same paths and `:quit` exits.

use super::ask::print_outcome;
use super::runtime::{cancel_on_ctrl_c, Session, SourceArgs};
use clap::Args;
use meridian_core::{config::AppConfig, AppError, AppResult};
use meridian_knowledge::CancellationToken;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive session over one document index
#[derive(Args, Debug)]
pub struct SessionCommand {
    #[command(flatten)]
    pub sources: SourceArgs,
}

impl SessionCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing session command");

        let (session, stats) = Session::open(config, &self.sources, true).await?;
        eprintln!(
            "Indexed {} chunks from {} sources{}. Type :reload or :quit.",
            stats.chunks,
            stats.sources,
            if session.web_enabled() { ", web search on" } else { "" }
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();

            match line {
                "" => continue,
                ":quit" | ":q" => break,
                ":reload" => match session.reload().await {
                    Ok(stats) => eprintln!("Reindexed {} chunks", stats.chunks),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => eprintln!("Reload failed: {}", e),
                },
                query => {
                    let cancel = CancellationToken::new();
                    let _guard = cancel_on_ctrl_c(&cancel);
                    match session.pipeline().ask(query, &cancel).await {
                        Ok(outcome) => print_outcome(&outcome),
                        Err(AppError::Cancelled) => eprintln!("Cancelled"),
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => eprintln!("Error: {}", e),
                    }
                    println!();
                }
            }
        }

        Ok(())
    }
}
