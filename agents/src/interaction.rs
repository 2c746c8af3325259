//! Interaction Agent (spec §4.9): synthesizes the draft answer from
//! accumulated evidence, or flags missing context instead of guessing.
//!
//! Interaction is the only agent that writes `state.missing_context` (spec
//! §4.12: the reinvocation trigger is tied to Interaction's own assessment,
//! not to whatever a specialist decided about its own retrieval). Card/Rules
//! agents only gather evidence; Interaction judges whether what they gathered
//! is enough, using the evidence's own coverage metadata (rule relevance
//! scores) rather than re-deriving a hit count.

use async_trait::async_trait;
use stack_sage_config::PromptContracts;
use stack_sage_contracts::{AgentError, AgentState, EvidenceKind, MissingContextKind};
use stack_sage_llm::Message;

use crate::traits::{Agent, AgentDeps};

const INTERACTION_TEMPERATURE: f32 = 0.1;

/// Below this top-score, retrieved rules are treated as off-topic noise
/// rather than usable evidence (spec §9, "coverage score... threshold (0.3)").
const RULE_COVERAGE_SCORE_THRESHOLD: f32 = 0.3;

pub struct InteractionAgent;

#[async_trait]
impl Agent for InteractionAgent {
    async fn run(&self, state: &mut AgentState, deps: &AgentDeps) -> Result<(), AgentError> {
        if state.user_question.trim().is_empty() {
            state.draft_answer = "Please ask a question.".to_string();
            return Ok(());
        }

        if state.missing_context.is_none() {
            if !state.extracted_cards.is_empty() && state.context.get(EvidenceKind::Cards).is_empty() {
                state.missing_context = Some(MissingContextKind::Cards);
            } else if matches!(
                state.intent,
                stack_sage_contracts::Intent::Rules | stack_sage_contracts::Intent::CardInteraction
            ) && !rules_evidence_is_adequate(state)
            {
                state.missing_context = Some(MissingContextKind::Rules);
            }
        }

        if let Some(kind) = state.missing_context {
            state.draft_answer = format!(
                "I don't have enough {} evidence yet to answer confidently.",
                match kind {
                    MissingContextKind::Cards => "card",
                    MissingContextKind::Rules => "rules",
                }
            );
            return Ok(());
        }

        let client = deps.llm_cache.get_or_create(&deps.config.llm_model, INTERACTION_TEMPERATURE).await;
        let evidence_block = render_evidence(state);
        let messages = [
            Message::system(PromptContracts::interaction()),
            Message::user(format!("Question: {}\n\nEvidence:\n{evidence_block}", state.user_question)),
        ];

        match client.complete(&messages, INTERACTION_TEMPERATURE).await {
            Ok(answer) => state.draft_answer = answer,
            Err(error) => {
                state.issues.push(format!("interaction: {}", error.user_message()));
                state.draft_answer =
                    "I ran into a problem generating an answer; please try again.".to_string();
            }
        }

        Ok(())
    }
}

/// Empty evidence is the clearest "not enough" signal; when rules evidence
/// exists, its top relevance score stands in for how well the retrieval
/// actually covered the question (spec §4.2 `RuleEvidence.score`).
fn rules_evidence_is_adequate(state: &AgentState) -> bool {
    let rules = state.context.get(EvidenceKind::Rules);
    let top_score = rules.iter().filter_map(|e| e.as_rule()).map(|r| r.score).fold(0.0_f32, f32::max);
    !rules.is_empty() && top_score >= RULE_COVERAGE_SCORE_THRESHOLD
}

fn render_evidence(state: &AgentState) -> String {
    let mut block = String::new();
    for card in state.context.get(EvidenceKind::Cards).iter().filter_map(|e| e.as_card()) {
        block.push_str(&format!("Card: {} — {}\n", card.name, card.oracle_text));
    }
    for rule in state.context.get(EvidenceKind::Rules).iter().filter_map(|e| e.as_rule()) {
        block.push_str(&format!("Rule {}: {}\n", rule.rule_id, rule.text));
    }
    for meta in state.context.get(EvidenceKind::Meta).iter().filter_map(|e| e.as_meta()) {
        block.push_str(&format!("Meta ({}): {}\n", meta.format, meta.summary));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stack_sage_cards::{CardSource, CardSourceAdapter, CardSourceError};
    use stack_sage_config::AppConfig;
    use stack_sage_contracts::{CardEvidence, CardSearchFilters, Intent};
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

    async fn sample_deps() -> AgentDeps {
        let cards = Arc::new(CardSourceAdapter::new(Arc::new(EmptySource), 10));
        let rules = Arc::new(RulesIndexHandle::unbuilt(Arc::new(LocalEmbeddingProvider::new())));
        rules.build_from_source("601.2a Casting a spell.\n").await.unwrap();
        let tools = Arc::new(ToolRegistry::new(cards, rules, Arc::new(NotConfiguredMetaSearch)));
        AgentDeps {
            tools,
            llm_cache: Arc::new(LlmClientCache::new("https://example.test", "key")),
            config: Arc::new(AppConfig::default()),
            meta_cache: Arc::new(stack_sage_caching::TtlCache::with_default_bands()),
        }
    }

    #[tokio::test]
    async fn empty_question_gets_a_refusal_not_an_llm_call() {
        let deps = sample_deps().await;
        let mut state = AgentState::new(Uuid::new_v4(), String::new());
        state.intent = Intent::Rules;

        InteractionAgent.run(&mut state, &deps).await.unwrap();

        assert_eq!(state.draft_answer, "Please ask a question.");
    }

    #[tokio::test]
    async fn missing_card_evidence_short_circuits_to_a_partial_draft() {
        let deps = sample_deps().await;
        let mut state = AgentState::new(Uuid::new_v4(), "What does Lightning Bolt do?".into());
        state.intent = Intent::CardInteraction;
        state.extracted_cards = vec!["Lightning Bolt".into()];

        InteractionAgent.run(&mut state, &deps).await.unwrap();

        assert_eq!(state.missing_context, Some(MissingContextKind::Cards));
        assert!(state.draft_answer.contains("card"));
    }
}
