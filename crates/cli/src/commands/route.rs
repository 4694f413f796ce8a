//! Route command handler.

use super::runtime::{Session, SourceArgs};
use clap::Args;
use meridian_core::{config::AppConfig, AppError, AppResult};

/// Show which sources a question would be routed to
#[derive(Args, Debug)]
pub struct RouteCommand {
    /// The question to classify
    pub query: String,

    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RouteCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing route command");

        let (session, _) = Session::open(config, &self.sources, false).await?;
        let decision = session.pipeline().router().route(&self.query).await;

        if self.json {
            let json = serde_json::to_string_pretty(&decision)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", decision.route);
            tracing::debug!(source = ?decision.source, rationale = %decision.rationale, "Routing decision");
        }
        Ok(())
    }
}
