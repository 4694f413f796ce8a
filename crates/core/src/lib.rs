//! Meridian Core Library
//!
//! This crate provides the foundational utilities shared by every Meridian crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Layered configuration (defaults, YAML, environment, CLI)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingConfig, EvidenceOrder, RagConfig, WebConfig};
pub use error::{AppError, AppResult};
