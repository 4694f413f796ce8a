//! Prompt system for Meridian.
//!
//! This crate provides structured prompt management with:
//! - Built-in prompt definitions for routing and grounded answering
//! - YAML overrides under `.meridian/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::{ANSWER_PROMPT_ID, ROUTE_PROMPT_ID};
pub use loader::{list_prompts, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOutputSpec};
