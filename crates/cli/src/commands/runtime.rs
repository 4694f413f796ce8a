//! Shared wiring for commands that answer questions.
//!
//! Builds the session index, the language-model client and the web fetcher
//! from configuration, and ties Ctrl-C to a cancellation token.

use clap::Args;
use meridian_core::{config::AppConfig, AppError, AppResult};
use meridian_knowledge::{
    create_provider, learn, CancellationToken, KnowledgeIndex, LearnOptions, LearnStats,
    RagPipeline,
};
use meridian_llm::create_client;
use meridian_web::{build_fetcher, WebEvidenceFetcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Evidence source options shared by every answering command.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Files or directories to index for this session (repeatable)
    #[arg(long = "path", value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Only index files whose path contains this pattern (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Skip files whose path contains this pattern (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Do not consult the web
    #[arg(long)]
    pub no_web: bool,

    /// Number of document chunks to retrieve
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Context budget in characters
    #[arg(long)]
    pub budget: Option<usize>,
}

/// A live index plus the pipeline that answers against it.
pub struct Session {
    index: Arc<KnowledgeIndex>,
    pipeline: RagPipeline,
    learn_options: LearnOptions,
    web_enabled: bool,
}

impl Session {
    /// Wire collaborators from `config` and `args`, then index the paths.
    ///
    /// With `require_sources`, having no documents and no web search is a
    /// configuration error.
    pub async fn open(
        config: &AppConfig,
        args: &SourceArgs,
        require_sources: bool,
    ) -> AppResult<(Self, LearnStats)> {
        let mut config = config.clone();
        if let Some(top_k) = args.top_k {
            config.rag.top_k = top_k;
        }
        if let Some(budget) = args.budget {
            config.rag.context_budget_chars = budget;
        }
        if args.no_web {
            config.web.enabled = false;
        }
        config.validate()?;

        let web = build_web(&config)?;
        if require_sources && args.paths.is_empty() && !web.is_enabled() {
            return Err(AppError::Config(
                "No evidence sources: upload documents with --path or enable web search"
                    .to_string(),
            ));
        }

        let embedder = create_provider(&config.embedding)?;
        let index = Arc::new(KnowledgeIndex::new(embedder).with_min_score(config.rag.min_score));

        let provider = config.provider.as_str();
        let api_key = config.resolve_api_key(provider);
        let endpoint = config.resolve_endpoint(provider);
        let llm = create_client(
            provider,
            endpoint.as_deref(),
            api_key.as_deref(),
            Duration::from_secs(config.resolve_llm_timeout(provider)),
        )
        .map_err(AppError::Config)?;

        let web_enabled = web.is_enabled();
        let pipeline = RagPipeline::from_config(&config, index.clone(), llm, web)?;

        let session = Self {
            index,
            pipeline,
            learn_options: LearnOptions {
                paths: args.paths.clone(),
                include: args.include.clone(),
                exclude: args.exclude.clone(),
                chunk_size: config.rag.chunk_size,
                chunk_overlap: config.rag.chunk_overlap,
            },
            web_enabled,
        };

        let stats = session.reload().await?;
        Ok((session, stats))
    }

    /// Rebuild the index from the session's paths.
    pub async fn reload(&self) -> AppResult<LearnStats> {
        let cancel = CancellationToken::new();
        let _guard = cancel_on_ctrl_c(&cancel);
        let stats = learn(&self.index, &self.learn_options, &cancel).await?;

        tracing::info!(
            sources = stats.sources,
            skipped = stats.skipped,
            chunks = stats.chunks,
            "Index ready"
        );
        Ok(stats)
    }

    pub fn pipeline(&self) -> &RagPipeline {
        &self.pipeline
    }

    pub fn web_enabled(&self) -> bool {
        self.web_enabled
    }
}

fn build_web(config: &AppConfig) -> AppResult<WebEvidenceFetcher> {
    if !config.web.enabled {
        return Ok(WebEvidenceFetcher::disabled());
    }
    let api_key = config.resolve_web_api_key();
    build_fetcher(&config.web, api_key.as_deref())
}

/// Watches Ctrl-C while alive; dropping it stops watching.
pub struct CtrlCGuard(JoinHandle<()>);

impl Drop for CtrlCGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Cancel `token` when the user presses Ctrl-C.
pub fn cancel_on_ctrl_c(token: &CancellationToken) -> CtrlCGuard {
    let token = token.clone();
    CtrlCGuard(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            token.cancel();
        }
    }))
}
