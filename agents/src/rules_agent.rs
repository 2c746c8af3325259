//! Rules Agent (spec §4.6): hybrid retrieval seeded by the question plus any
//! extracted card names.
//!
//! This agent only gathers evidence; it never sets `missing_context` itself.
//! Whether the retrieval turned out thin enough to re-invoke is Interaction's
//! judgment to make from the evidence this agent left in `state.context`
//! (spec §4.12 ties the reinvocation trigger to Interaction's own assessment,
//! not to whichever specialist ran most recently).

use async_trait::async_trait;
use stack_sage_contracts::{AgentError, AgentState, Citation, Evidence, EvidenceKind};
use stack_sage_tools::search_rules_hybrid;

use crate::traits::{Agent, AgentDeps};

const RETRIEVAL_K: usize = 8;

pub struct RulesAgent;

#[async_trait]
impl Agent for RulesAgent {
    async fn run(&self, state: &mut AgentState, deps: &AgentDeps) -> Result<(), AgentError> {
        let mut query = state.user_question.clone();
        for name in &state.extracted_cards {
            query.push(' ');
            query.push_str(name);
        }

        match search_rules_hybrid(&deps.tools, &query, RETRIEVAL_K, 0.0).await {
            Ok(results) => {
                for rule in results {
                    state.citations.push(Citation::Rule { rule_id: rule.rule_id.clone(), text: rule.text.clone() });
                    state.context.push(EvidenceKind::Rules, Evidence::Rule(rule));
                }
            }
            Err(error) => {
                state.issues.push(format!("rules retrieval: {}", error.user_message()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stack_sage_cards::{CardSource, CardSourceAdapter, CardSourceError};
    use stack_sage_config::AppConfig;
    use stack_sage_contracts::{CardEvidence, CardSearchFilters};
    use stack_sage_llm::LlmClientCache;
    use stack_sage_rules::{LocalEmbeddingProvider, RulesIndexHandle};
    use stack_sage_tools::{NotConfiguredMetaSearch, ToolRegistry};
    use uuid::Uuid;

    struct EmptySource;

    #[async_trait::async_trait]
    impl CardSource for EmptySource {
        async fn fetch_card(&self, name: &str) -> Result<CardEvidence, CardSourceError> {
            Err(CardSourceError::NotFound(name.to_string()))
        }
        async fn search_by_criteria(&self, _: &CardSearchFilters) -> Result<Vec<CardEvidence>, CardSourceError> {
            Ok(vec![])
        }
    }

    async fn deps_with_rules(source_text: &str) -> AgentDeps {
        let cards = Arc::new(CardSourceAdapter::new(Arc::new(EmptySource), 10));
        let rules = Arc::new(RulesIndexHandle::unbuilt(Arc::new(LocalEmbeddingProvider::new())));
        rules.build_from_source(source_text).await.unwrap();
        let tools = Arc::new(ToolRegistry::new(cards, rules, Arc::new(NotConfiguredMetaSearch)));
        AgentDeps {
            tools,
            llm_cache: Arc::new(LlmClientCache::new("https://example.test", "key")),
            config: Arc::new(AppConfig::default()),
            meta_cache: Arc::new(stack_sage_caching::TtlCache::with_default_bands()),
        }
    }

    #[tokio::test]
    async fn thin_retrieval_still_leaves_missing_context_for_interaction_to_decide() {
        let deps = deps_with_rules("601.2a Casting a spell requires these steps.\n").await;
        let mut state = AgentState::new(Uuid::new_v4(), "Tell me about deathtouch interactions".into());

        RulesAgent.run(&mut state, &deps).await.unwrap();

        // RulesAgent never writes missing_context; that judgment belongs to
        // Interaction, which sees the same evidence this agent left behind.
        assert_eq!(state.missing_context, None);
        assert!(!state.context.get(EvidenceKind::Rules).is_empty());
    }

    #[tokio::test]
    async fn good_coverage_leaves_rules_evidence_populated() {
        let source = "\
104.3a A player loses the game if their life total is 0 or less.\n\
702.2a Deathtouch is a static ability.\n\
702.2b Any nonzero damage marked by a source with deathtouch is lethal.\n\
601.2a To cast a spell, a player follows these steps in order.\n\
601.2b The player announces the spell.\n\
601.2c The player chooses modes, targets, and values.\n";
        let deps = deps_with_rules(source).await;
        let mut state = AgentState::new(Uuid::new_v4(), "How does casting a spell with deathtouch work?".into());

        RulesAgent.run(&mut state, &deps).await.unwrap();

        assert_eq!(state.missing_context, None);
        assert!(state.context.get(EvidenceKind::Rules).len() >= 6);
    }

    #[tokio::test]
    async fn retrieval_failure_is_an_issue_not_a_missing_context_flag() {
        let cards = Arc::new(CardSourceAdapter::new(Arc::new(EmptySource), 10));
        let rules = Arc::new(RulesIndexHandle::unbuilt(Arc::new(LocalEmbeddingProvider::new())));
        // Left unbuilt: any query against it fails with IndexUnavailable.
        let tools = Arc::new(ToolRegistry::new(cards, rules, Arc::new(NotConfiguredMetaSearch)));
        let deps = AgentDeps {
            tools,
            llm_cache: Arc::new(LlmClientCache::new("https://example.test", "key")),
            config: Arc::new(AppConfig::default()),
            meta_cache: Arc::new(stack_sage_caching::TtlCache::with_default_bands()),
        };
        let mut state = AgentState::new(Uuid::new_v4(), "What does deathtouch do?".into());

        RulesAgent.run(&mut state, &deps).await.unwrap();

        assert_eq!(state.missing_context, None);
        assert_eq!(state.issues.len(), 1);
        assert!(state.context.get(EvidenceKind::Rules).is_empty());
    }
}
