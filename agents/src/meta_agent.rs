//! Meta Agent (spec §4.7): web metagame search gated behind the Meta Cache,
//! invoked only for the `meta` intent.

use async_trait::async_trait;
use stack_sage_caching::TtlLookup;
use stack_sage_contracts::{AgentError, AgentState, Evidence, EvidenceKind, MetaEvidence};
use stack_sage_tools::search_mtg_meta;

use crate::patterns::infer_format;
use crate::traits::{Agent, AgentDeps};

const MAX_RESULTS: usize = 5;

pub struct MetaAgent;

#[async_trait]
impl Agent for MetaAgent {
    async fn run(&self, state: &mut AgentState, deps: &AgentDeps) -> Result<(), AgentError> {
        let format = infer_format(&state.user_question);

        if let Some(format) = format {
            match deps.meta_cache.get(&format.to_string()).await {
                TtlLookup::Fresh(evidence) => {
                    state.context.push(EvidenceKind::Meta, Evidence::Meta(evidence));
                    return Ok(());
                }
                TtlLookup::Stale(mut evidence) => {
                    evidence.stale = true;
                    state.context.push(EvidenceKind::Meta, Evidence::Meta(evidence));
                    return Ok(());
                }
                TtlLookup::Miss => {}
            }
        }

        match search_mtg_meta(&deps.tools, &state.user_question, MAX_RESULTS).await {
            Ok(sources) => {
                let evidence = MetaEvidence {
                    format: format.unwrap_or("unspecified").to_string(),
                    snapshot_date: chrono::Utc::now(),
                    summary: format!("{} metagame source(s) found", sources.len()),
                    sources,
                    stale: false,
                };
                if let Some(format) = format {
                    deps.meta_cache.insert(format.to_string(), evidence.clone()).await;
                }
                state.context.push(EvidenceKind::Meta, Evidence::Meta(evidence));
            }
            Err(error) => {
                state.issues.push(format!("metagame search: {}", error.user_message()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait as async_trait_attr;
    use stack_sage_cards::{CardSource, CardSourceAdapter, CardSourceError};
    use stack_sage_caching::TtlCache;
    use stack_sage_config::AppConfig;
    use stack_sage_contracts::{CardEvidence, CardSearchFilters, MetaSource};
    use stack_sage_llm::LlmClientCache;
    use stack_sage_rules::{LocalEmbeddingProvider, RulesIndexHandle};
    use stack_sage_tools::{MetaSearchClient, ToolRegistry};
    use uuid::Uuid;

    struct EmptyCardSource;

    #[async_trait_attr]
    impl CardSource for EmptyCardSource {
        async fn fetch_card(&self, name: &str) -> Result<CardEvidence, CardSourceError> {
            Err(CardSourceError::NotFound(name.to_string()))
        }
        async fn search_by_criteria(&self, _: &CardSearchFilters) -> Result<Vec<CardEvidence>, CardSourceError> {
            Ok(vec![])
        }
    }

    struct CountingMetaSearch {
        calls: std::sync::atomic::AtomicU32,
    }

    #[async_trait_attr]
    impl MetaSearchClient for CountingMetaSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<MetaSource>, AgentError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(vec![MetaSource {
                title: "Modern metagame breakdown".into(),
                url: "https://example.test/modern".into(),
                snippet: "Izzet Murktide leads the field.".into(),
            }])
        }
    }

    async fn deps_with_counting_search() -> (AgentDeps, Arc<CountingMetaSearch>) {
        let cards = Arc::new(CardSourceAdapter::new(Arc::new(EmptyCardSource), 10));
        let rules = Arc::new(RulesIndexHandle::unbuilt(Arc::new(LocalEmbeddingProvider::new())));
        rules.build_from_source("601.2a Casting a spell.\n").await.unwrap();
        let search = Arc::new(CountingMetaSearch { calls: std::sync::atomic::AtomicU32::new(0) });
        let tools = Arc::new(ToolRegistry::new(cards, rules, search.clone()));
        let deps = AgentDeps {
            tools,
            llm_cache: Arc::new(LlmClientCache::new("https://example.test", "key")),
            config: Arc::new(AppConfig::default()),
            meta_cache: Arc::new(TtlCache::new(Duration::from_secs(86400), Duration::from_secs(604800))),
        };
        (deps, search)
    }

    #[tokio::test]
    async fn second_call_for_the_same_format_hits_the_cache() {
        let (deps, search) = deps_with_counting_search().await;

        let mut first = AgentState::new(Uuid::new_v4(), "What's winning in modern right now?".into());
        MetaAgent.run(&mut first, &deps).await.unwrap();

        let mut second = AgentState::new(Uuid::new_v4(), "What's winning in modern right now?".into());
        MetaAgent.run(&mut second, &deps).await.unwrap();

        assert_eq!(search.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert!(!state_meta_empty(&second));
    }

    fn state_meta_empty(state: &AgentState) -> bool {
        state.context.get(EvidenceKind::Meta).is_empty()
    }
}
