//! Deck Agent (spec §4.8): parses the question as decklist text and runs the
//! Deck Validator.
//!
//! `AgentState` carries no dedicated decklist/format/commander fields (spec
//! §3) — those only exist on the dedicated deck-validate external interface
//! (spec §6), which calls the parser and validator directly. For the
//! conversational `deck_validation` intent reached through the graph, this
//! agent treats the entire question as decklist text, inferring format and
//! commander from it; lines that aren't `<count> <name>` become parser
//! warnings rather than blocking validation (spec §4.8 failure semantics).

use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use stack_sage_contracts::{AgentError, AgentState, CardEvidence, Citation, DeckEvidence, Evidence, EvidenceKind};
use stack_sage_deck::{parse_decklist, DeckValidator};
use stack_sage_tools::compare_multiple_cards;

use crate::patterns::infer_format;
use crate::traits::{Agent, AgentDeps};

fn commander_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)commander:\s*([^\n]+)").unwrap())
}

fn infer_commander(text: &str) -> Option<String> {
    commander_pattern()
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

pub struct DeckAgent;

#[async_trait]
impl Agent for DeckAgent {
    async fn run(&self, state: &mut AgentState, deps: &AgentDeps) -> Result<(), AgentError> {
        let format = infer_format(&state.user_question).unwrap_or("modern");
        let commander = infer_commander(&state.user_question);

        let (deck, parse_warnings) =
            parse_decklist(&state.user_question, format, commander.as_deref());
        state.issues.extend(parse_warnings);

        let mut names: Vec<String> = deck.mainboard.keys().chain(deck.sideboard.keys()).cloned().collect();
        if let Some(commander_name) = &deck.commander {
            names.push(commander_name.clone());
        }
        names.sort();
        names.dedup();

        let fetches = compare_multiple_cards(&deps.tools, &names).await;
        let mut card_lookup: HashMap<String, CardEvidence> = HashMap::new();
        for (name, result) in names.into_iter().zip(fetches) {
            match result {
                Ok(card) => {
                    state.citations.push(Citation::Card { name: card.name.clone(), set: card.set.clone() });
                    card_lookup.insert(name.trim().to_ascii_lowercase(), card);
                }
                Err(error) => {
                    state.issues.push(format!("card \"{name}\": {}", error.user_message()));
                }
            }
        }

        let validation = DeckValidator.validate(&deck, &card_lookup);
        state.context.push(EvidenceKind::Deck, Evidence::Deck(DeckEvidence { deck, validation }));

        Ok(())
    }
}
