//! Finalizer Agent (spec §4.11): pure formatter. Assembles the verified draft,
//! a citations block, and the tools used into the user-visible answer. Never
//! adds factual content of its own.

use async_trait::async_trait;
use stack_sage_contracts::{AgentError, AgentState, Citation};

use crate::traits::{Agent, AgentDeps};

pub struct FinalizerAgent;

#[async_trait]
impl Agent for FinalizerAgent {
    async fn run(&self, state: &mut AgentState, _deps: &AgentDeps) -> Result<(), AgentError> {
        let mut answer = state.draft_answer.clone();

        let citations = render_citations(&state.citations);
        if !citations.is_empty() {
            answer.push_str("\n\nSources:\n");
            answer.push_str(&citations);
        }

        if !state.issues.is_empty() {
            answer.push_str("\n\nNote: ");
            answer.push_str(&state.issues.join("; "));
        }

        state.final_answer = Some(answer);
        Ok(())
    }
}

fn render_citations(citations: &[Citation]) -> String {
    let mut seen = std::collections::HashSet::new();
    let mut lines = Vec::new();
    for citation in citations {
        let line = match citation {
            Citation::Card { name, set } => format!("- {name} ({set})"),
            Citation::Rule { rule_id, text } => format!("- Rule {rule_id}: {text}"),
        };
        if seen.insert(line.clone()) {
            lines.push(line);
        }
    }
    lines.join("\n")
}
