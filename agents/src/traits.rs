//! The `Agent` trait every graph node implements, and the bundle of
//! process-wide components agents are injected with (spec §9: "global
//! mutable singletons → explicit process-wide components with a documented
//! lifecycle").

use std::sync::Arc;

use async_trait::async_trait;
use stack_sage_caching::TtlCache;
use stack_sage_config::AppConfig;
use stack_sage_contracts::{AgentError, AgentState, MetaEvidence};
use stack_sage_llm::LlmClientCache;
use stack_sage_tools::ToolRegistry;

/// Process-wide components every agent is constructed with by dependency
/// injection rather than reaching for a singleton (spec §9).
pub struct AgentDeps {
    pub tools: Arc<ToolRegistry>,
    pub llm_cache: Arc<LlmClientCache>,
    pub config: Arc<AppConfig>,
    /// Keyed by format name (spec §4.7, §6: "Meta TTL 24h/warn-7d").
    pub meta_cache: Arc<TtlCache<String, MetaEvidence>>,
}

/// A single node in the multi-agent graph. `run` mutates `state` in place and
/// only returns `Err` for a fatal [`AgentError`] (an
/// `InternalInvariantBreach`) — every other failure an agent encounters is
/// caught internally and appended to `state.issues` (spec §7 propagation
/// policy).
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(&self, state: &mut AgentState, deps: &AgentDeps) -> Result<(), AgentError>;
}
