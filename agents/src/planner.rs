//! Planner Agent (spec §4.4): classifies intent and extracts card names via
//! a strict-JSON, temperature-0 LLM call, then builds the task plan.

use std::collections::VecDeque;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use stack_sage_contracts::{AgentError, AgentId, AgentState, Intent};
use stack_sage_llm::{call_with_json_contract, Message};

use crate::traits::{Agent, AgentDeps};

/// Forced regardless of `LLM_TEMPERATURE` (spec §4.4, §6).
const PLANNER_TEMPERATURE: f32 = 0.0;

#[derive(Debug, Deserialize)]
struct PlannerResponse {
    card_names: Vec<String>,
    intent: Intent,
}

fn controller_sensitive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(opponent controls|opponent's|my\b|their\b|your\b|i control)").unwrap()
    })
}

pub struct PlannerAgent;

#[async_trait]
impl Agent for PlannerAgent {
    async fn run(&self, state: &mut AgentState, deps: &AgentDeps) -> Result<(), AgentError> {
        let client = deps.llm_cache.get_or_create(&deps.config.llm_model, PLANNER_TEMPERATURE).await;
        let messages = [
            Message::system(stack_sage_config::PromptContracts::planner()),
            Message::user(state.user_question.as_str()),
        ];

        let parsed: Option<PlannerResponse> =
            call_with_json_contract(client.as_ref(), &messages, PLANNER_TEMPERATURE).await;

        let (card_names, intent) = match parsed {
            Some(response) => (response.card_names, response.intent),
            None => {
                state
                    .issues
                    .push("planner could not parse a JSON response; falling back to rules intent".to_string());
                (Vec::new(), Intent::Rules)
            }
        };

        state.extracted_cards = card_names;
        state.intent = intent;
        state.controller_sensitive = controller_sensitive_pattern().is_match(&state.user_question);
        state.task_plan = build_task_plan(intent, !state.extracted_cards.is_empty());

        Ok(())
    }
}

/// Deterministic from intent + whether any card names were extracted
/// (spec §4.4 "Task-plan construction").
fn build_task_plan(intent: Intent, has_cards: bool) -> VecDeque<AgentId> {
    let mut plan = VecDeque::new();
    match intent {
        Intent::DeckValidation => {
            plan.push_back(AgentId::Deck);
            plan.push_back(AgentId::Finalizer);
        }
        Intent::Meta => {
            plan.push_back(AgentId::Meta);
            if has_cards {
                plan.push_back(AgentId::Cards);
            }
            plan.push_back(AgentId::Interaction);
            plan.push_back(AgentId::Finalizer);
        }
        Intent::CardInteraction | Intent::Rules => {
            if has_cards {
                plan.push_back(AgentId::Cards);
            }
            plan.push_back(AgentId::Rules);
            plan.push_back(AgentId::Interaction);
            plan.push_back(AgentId::Judge);
            plan.push_back(AgentId::Finalizer);
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_validation_plan_skips_judge() {
        let plan = build_task_plan(Intent::DeckValidation, false);
        assert_eq!(plan, VecDeque::from([AgentId::Deck, AgentId::Finalizer]));
    }

    #[test]
    fn meta_plan_includes_cards_only_when_present() {
        let without_cards = build_task_plan(Intent::Meta, false);
        assert_eq!(
            without_cards,
            VecDeque::from([AgentId::Meta, AgentId::Interaction, AgentId::Finalizer])
        );
        let with_cards = build_task_plan(Intent::Meta, true);
        assert_eq!(
            with_cards,
            VecDeque::from([AgentId::Meta, AgentId::Cards, AgentId::Interaction, AgentId::Finalizer])
        );
    }

    #[test]
    fn rules_plan_with_cards_runs_the_full_chain() {
        let plan = build_task_plan(Intent::CardInteraction, true);
        assert_eq!(
            plan,
            VecDeque::from([
                AgentId::Cards,
                AgentId::Rules,
                AgentId::Interaction,
                AgentId::Judge,
                AgentId::Finalizer
            ])
        );
    }

    #[test]
    fn controller_sensitive_phrasing_is_detected() {
        assert!(controller_sensitive_pattern()
            .is_match("If my opponent controls Blood Artist and their creature dies, who gains life?"));
        assert!(!controller_sensitive_pattern().is_match("What does Lightning Bolt do?"));
    }
}
