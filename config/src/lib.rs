//! Centralized configuration: environment options, per-format deck-building
//! rule catalog, and the fixed prompt contracts agents speak to the LLM.

pub mod environment;
pub mod format_catalog;
pub mod prompts;

pub use environment::{AppConfig, ConfigError, EmbeddingMode};
pub use format_catalog::{rules_for, CopyLimit, FormatRules};
pub use prompts::PromptContracts;
