//! Environment-level configuration (spec §6).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Where rule-chunk embeddings come from. Only the dimensionality differs
/// between the two modes; the vector store records whichever was used at
/// build time and refuses to load against a mismatched mode (spec §6, "Rules
/// index build").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingMode {
    Hosted,
    Local,
}

impl EmbeddingMode {
    /// Vector dimensionality produced by each mode. Hosted uses a
    /// production-scale embedding endpoint; Local uses a lower-dimensionality
    /// deterministic projection that needs no network access (spec §4.2).
    pub fn dimensions(&self) -> usize {
        match self {
            EmbeddingMode::Hosted => 1536,
            EmbeddingMode::Local => 256,
        }
    }
}

impl std::str::FromStr for EmbeddingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hosted" => Ok(EmbeddingMode::Hosted),
            "local" => Ok(EmbeddingMode::Local),
            other => Err(ConfigError::Invalid(format!(
                "EMBEDDING_MODE must be 'hosted' or 'local', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

/// Environment-recognized options (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    pub llm_model: String,
    #[validate(range(min = 0.0, max = 2.0))]
    pub llm_temperature: f32,
    pub embedding_mode: EmbeddingModeConfig,
    pub meta_search_credential: Option<String>,
    pub verbose: bool,

    // Cache limits (spec §6).
    pub card_cache_capacity: usize,
    pub rules_query_cache_capacity: usize,

    // Timing budgets (spec §4.12, §5).
    pub node_timeout_secs: u64,
    pub request_budget_secs: u64,
    pub recursion_cap: u32,
}

/// Serde-friendly mirror of [`EmbeddingMode`] so figment can deserialize the
/// raw `EMBEDDING_MODE` string without a custom visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingModeConfig {
    Hosted,
    Local,
}

impl From<EmbeddingModeConfig> for EmbeddingMode {
    fn from(value: EmbeddingModeConfig) -> Self {
        match value {
            EmbeddingModeConfig::Hosted => EmbeddingMode::Hosted,
            EmbeddingModeConfig::Local => EmbeddingMode::Local,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_model: "gpt-4o-mini-equivalent".to_string(),
            llm_temperature: 0.1,
            embedding_mode: EmbeddingModeConfig::Local,
            meta_search_credential: None,
            verbose: false,
            card_cache_capacity: 1000,
            rules_query_cache_capacity: 100,
            node_timeout_secs: 30,
            request_budget_secs: 60,
            recursion_cap: 15,
        }
    }
}

impl AppConfig {
    /// Layer defaults under environment variables (`STACK_SAGE_*`), the only
    /// seam an out-of-scope CLI entrypoint needs to call (spec §6).
    pub fn from_env() -> Result<Self, ConfigError> {
        use figment::providers::{Env, Serialized};
        use figment::Figment;

        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Env::prefixed("STACK_SAGE_").split("__"))
            .extract()?;

        config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(config)
    }

    pub fn embedding_mode(&self) -> EmbeddingMode {
        self.embedding_mode.into()
    }

    pub fn meta_search_configured(&self) -> bool {
        self.meta_search_credential
            .as_ref()
            .is_some_and(|c| !c.is_empty())
    }
}
