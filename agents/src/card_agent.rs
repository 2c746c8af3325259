//! Card Agent (spec §4.5): resolves `extracted_cards` into `Card` evidence,
//! falling back to a conservative regex extraction when Planner found none.

use async_trait::async_trait;
use stack_sage_contracts::{AgentError, AgentState, Citation, Evidence, EvidenceKind};
use stack_sage_tools::compare_multiple_cards;

use crate::patterns::title_cased_candidates;
use crate::traits::{Agent, AgentDeps};

pub struct CardAgent;

#[async_trait]
impl Agent for CardAgent {
    async fn run(&self, state: &mut AgentState, deps: &AgentDeps) -> Result<(), AgentError> {
        let names = if state.extracted_cards.is_empty() {
            title_cased_candidates(&state.user_question)
        } else {
            state.extracted_cards.clone()
        };

        if names.is_empty() {
            return Ok(());
        }

        let results = compare_multiple_cards(&deps.tools, &names).await;

        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(card) => {
                    state.citations.push(Citation::Card { name: card.name.clone(), set: card.set.clone() });
                    state.context.push(EvidenceKind::Cards, Evidence::Card(card));
                }
                Err(error) => {
                    state.issues.push(format!("card \"{name}\": {}", error.user_message()));
                }
            }
        }

        Ok(())
    }
}
