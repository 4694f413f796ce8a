//! Configuration management for Meridian.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`.meridian/config.yaml` or `MERIDIAN_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Nothing here is persisted: the vector index lives for one session only,
//! so the config file is read but never written.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// LLM providers the client factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 3] = ["ollama", "openai", "groq"];

/// Embedding providers the knowledge crate knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (may contain .meridian/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("ollama", "openai", "groq")
    pub provider: String,

    /// Model identifier used for routing and synthesis
    pub model: String,

    /// Explicit API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Embedding function settings
    pub embedding: EmbeddingConfig,

    /// Retrieval, fusion and synthesis settings
    pub rag: RagConfig,

    /// Web search settings
    pub web: WebConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    /// OpenAI-compatible chat completion APIs (OpenAI, Groq)
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// Embedding function settings.
///
/// The same function embeds chunks at ingestion and queries at search time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" (offline) or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Optional endpoint for HTTP providers
    pub endpoint: Option<String>,

    /// Request timeout for HTTP providers
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

/// How document and web evidence are ordered before budget packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvidenceOrder {
    /// All document records, then all web records
    #[default]
    DocumentsFirst,
    /// All web records, then all document records
    WebFirst,
    /// Alternate document and web records, starting with documents
    Interleaved,
}

/// Retrieval, fusion and synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RagConfig {
    /// Number of chunks retrieved from the vector index
    pub top_k: usize,

    /// Maximum combined characters of evidence handed to the synthesizer
    pub context_budget_chars: usize,

    /// Ordering of document vs. web evidence
    pub evidence_order: EvidenceOrder,

    /// Minimum cosine similarity for a chunk to count as evidence
    pub min_score: f32,

    /// Chunk size in characters for ingestion
    pub chunk_size: usize,

    /// Overlap between consecutive chunks
    pub chunk_overlap: usize,

    /// Timeout for the routing oracle call
    pub router_timeout_secs: u64,

    /// Timeout for the answer synthesis call
    pub synthesis_timeout_secs: u64,

    /// Sampling temperature for routing and synthesis
    pub temperature: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            context_budget_chars: 6000,
            evidence_order: EvidenceOrder::DocumentsFirst,
            min_score: 0.0,
            chunk_size: 800,
            chunk_overlap: 100,
            router_timeout_secs: 15,
            synthesis_timeout_secs: 60,
            temperature: 0.0,
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WebConfig {
    /// Whether live web search is consulted at all
    pub enabled: bool,

    /// Provider name ("tavily")
    pub provider: String,

    /// Environment variable holding the provider API key
    pub api_key_env: String,

    /// Optional endpoint override
    pub endpoint: Option<String>,

    /// Maximum snippets requested per query
    pub max_results: usize,

    /// Timeout for one search call
    pub timeout_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "tavily".to_string(),
            api_key_env: "TAVILY_API_KEY".to_string(),
            endpoint: None,
            max_results: 3,
            timeout_secs: 10,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    embedding: Option<EmbeddingConfig>,
    rag: Option<RagConfig>,
    web: Option<WebConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
            llm: None,
            embedding: EmbeddingConfig::default(),
            rag: RagConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and environment variables.
    ///
    /// Environment variables:
    /// - `MERIDIAN_WORKSPACE`: Override workspace path
    /// - `MERIDIAN_CONFIG`: Path to config file
    /// - `MERIDIAN_PROVIDER`: LLM provider
    /// - `MERIDIAN_MODEL`: Model identifier
    /// - `MERIDIAN_API_KEY`: API key for the LLM provider
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use meridian_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("MERIDIAN_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("MERIDIAN_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.meridian_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file does not exist: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("MERIDIAN_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("MERIDIAN_MODEL") {
            config.model = model;
        }

        if let Ok(key) = std::env::var("MERIDIAN_API_KEY") {
            config.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merge_file(config_file))
    }

    fn merge_file(mut self, config_file: ConfigFile) -> Self {
        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            self.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(json) = logging.json {
                self.log_json = json;
            }
        }

        if let Some(llm) = config_file.llm {
            self.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                self.model = provider_config.model().to_string();
            } else if llm.active_provider == "groq" {
                self.model = "llama-3.1-8b-instant".to_string();
            }

            self.llm = Some(llm);
        }

        if let Some(embedding) = config_file.embedding {
            self.embedding = embedding;
        }

        if let Some(rag) = config_file.rag {
            self.rag = rag;
        }

        if let Some(web) = config_file.web {
            self.web = web;
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Get the path to the .meridian directory.
    pub fn meridian_dir(&self) -> PathBuf {
        self.workspace.join(".meridian")
    }

    /// Get the configuration for a provider, if the config file declared one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the endpoint for a provider from its configuration.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(str::to_string)
    }

    /// Resolve the request timeout for a provider, falling back to the synthesis timeout.
    pub fn resolve_llm_timeout(&self, provider: &str) -> u64 {
        match self.get_provider_config(provider) {
            Some(ProviderConfig::Ollama {
                timeout: Some(secs),
                ..
            }) => *secs,
            _ => self.rag.synthesis_timeout_secs,
        }
    }

    /// Resolve the API key for an LLM provider.
    ///
    /// Order: explicit `MERIDIAN_API_KEY`, the provider's `apiKeyEnv`,
    /// then the provider's conventional environment variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            if let Ok(key) = std::env::var(api_key_env) {
                return Some(key);
            }
        }

        let conventional = match provider {
            "openai" => "OPENAI_API_KEY",
            "groq" => "GROQ_API_KEY",
            _ => return None,
        };

        std::env::var(conventional).ok()
    }

    /// Resolve the web search API key from the configured environment variable.
    pub fn resolve_web_api_key(&self) -> Option<String> {
        std::env::var(&self.web.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate the configuration.
    ///
    /// Every failure here is a configuration error: it is fatal and never retried.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider != "ollama" && self.resolve_api_key(provider).is_none() {
            return Err(AppError::Config(format!(
                "API key not found for provider '{}'",
                provider
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.rag.top_k == 0 {
            return Err(AppError::Config("rag.topK must be at least 1".to_string()));
        }

        if self.rag.context_budget_chars == 0 {
            return Err(AppError::Config(
                "rag.contextBudgetChars must be at least 1".to_string(),
            ));
        }

        if self.rag.chunk_size == 0 || self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(AppError::Config(format!(
                "rag.chunkOverlap ({}) must be smaller than rag.chunkSize ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }

        for (key, secs) in [
            ("rag.routerTimeoutSecs", self.rag.router_timeout_secs),
            ("rag.synthesisTimeoutSecs", self.rag.synthesis_timeout_secs),
            ("web.timeoutSecs", self.web.timeout_secs),
        ] {
            if secs == 0 {
                return Err(AppError::Config(format!("{} must be at least 1", key)));
            }
        }

        if self.web.enabled {
            if self.web.provider != "tavily" {
                return Err(AppError::Config(format!(
                    "Unknown web search provider: {}. Supported: tavily",
                    self.web.provider
                )));
            }

            if self.resolve_web_api_key().is_none() {
                return Err(AppError::Config(format!(
                    "Web search is enabled but no API key was found in environment variable: {}",
                    self.web.api_key_env
                )));
            }
        }

        Ok(())
    }
}
