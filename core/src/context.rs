//! Composition root (spec §9: "explicit process-wide components with a
//! documented lifecycle" in place of global mutable singletons). Built once
//! at startup by an out-of-scope entrypoint and shared behind `Arc` across
//! concurrent requests.

use std::sync::Arc;

use stack_sage_agents::AgentDeps;
use stack_sage_caching::TtlCache;
use stack_sage_cards::{CardSource, CardSourceAdapter, ScryfallSource};
use stack_sage_config::AppConfig;
use stack_sage_contracts::{AgentError, MetaEvidence};
use stack_sage_graph::Graph;
use stack_sage_llm::LlmClientCache;
use stack_sage_rules::{EmbeddingProvider, HostedEmbeddingProvider, LocalEmbeddingProvider, RulesIndexHandle};
use stack_sage_tools::{MetaSearchClient, NotConfiguredMetaSearch, ToolRegistry, WebMetaSearchClient};

/// Endpoints an out-of-scope entrypoint supplies alongside [`AppConfig`];
/// none of these are read from the environment directly by this crate (spec
/// §6: "CLI startup scripts and `.env` loading remain out of scope").
pub struct Endpoints {
    pub scryfall_base_url: String,
    pub embedding_endpoint: Option<String>,
    pub llm_api_base: String,
    pub llm_api_key: String,
    pub meta_search_endpoint: Option<String>,
}

pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub rules: Arc<RulesIndexHandle>,
    graph: Graph,
}

impl AppContext {
    pub fn new(config: AppConfig, endpoints: Endpoints) -> Self {
        Self::with_card_source(config, endpoints, |base_url| Arc::new(ScryfallSource::new(base_url)))
    }

    /// Same composition as [`AppContext::new`], but with the raw card
    /// transport supplied by the caller — the seam integration tests use to
    /// substitute a fake instead of hitting Scryfall (spec §9).
    pub fn with_card_source(
        config: AppConfig,
        endpoints: Endpoints,
        card_source: impl FnOnce(String) -> Arc<dyn CardSource>,
    ) -> Self {
        let config = Arc::new(config);

        let cards = Arc::new(CardSourceAdapter::new(
            card_source(endpoints.scryfall_base_url),
            config.card_cache_capacity,
        ));

        let embedder: Arc<dyn EmbeddingProvider> = match config.embedding_mode() {
            stack_sage_config::EmbeddingMode::Hosted => Arc::new(HostedEmbeddingProvider::new(
                endpoints.embedding_endpoint.unwrap_or_default(),
            )),
            stack_sage_config::EmbeddingMode::Local => Arc::new(LocalEmbeddingProvider::new()),
        };
        let rules = Arc::new(RulesIndexHandle::unbuilt(embedder));

        let meta_search: Arc<dyn MetaSearchClient> = if config.meta_search_configured() {
            Arc::new(WebMetaSearchClient::new(
                endpoints.meta_search_endpoint.unwrap_or_default(),
                config.meta_search_credential.clone().unwrap_or_default(),
            ))
        } else {
            Arc::new(NotConfiguredMetaSearch)
        };

        let tools = Arc::new(ToolRegistry::new(cards, rules.clone(), meta_search));
        let llm_cache = Arc::new(LlmClientCache::new(endpoints.llm_api_base, endpoints.llm_api_key));
        let meta_cache = Arc::new(TtlCache::<String, MetaEvidence>::with_default_bands());

        let deps = AgentDeps { tools, llm_cache, config: config.clone(), meta_cache };
        let graph = Graph::new(deps);

        Self { config, rules, graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Offline rules-index build (spec §6: "Rules index build"). Must
    /// complete before the first `ask` call that needs rules retrieval —
    /// callers typically run this once at startup against the Comprehensive
    /// Rules document.
    pub async fn build_rules_index(&self, source: &str) -> Result<usize, AgentError> {
        self.rules.build_from_source(source).await
    }
}
