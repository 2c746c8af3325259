//! External interfaces (spec §6): the functions an out-of-scope HTTP adapter
//! would call directly. This crate defines no routes or request parsing.

use std::collections::HashMap;

use stack_sage_caching::TtlLookup;
use stack_sage_contracts::{
    AgentError, CardEvidence, CardSearchFilters, Citation, DeckValidationResult, JudgeReport, MetaEvidence,
};
use stack_sage_deck::{parse_decklist, DeckValidator};
use stack_sage_tools::{compare_multiple_cards, search_cards_by_criteria, search_mtg_meta};
use uuid::Uuid;

use crate::context::AppContext;

/// Diagnostics surfaced alongside an `ask` answer (spec §6).
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub agent_timings: HashMap<String, f64>,
    pub judge_report: JudgeReport,
    pub stale_meta: bool,
}

#[derive(Debug, Clone)]
pub struct AskResponse {
    pub answer: String,
    pub tools_used: Vec<String>,
    pub citations: Vec<Citation>,
    pub diagnostics: Diagnostics,
    pub success: bool,
}

#[derive(Debug, Clone)]
pub struct DeckValidateResponse {
    pub is_legal: bool,
    pub format: String,
    pub total_cards: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CardSearchResponse {
    pub total_cards: usize,
    pub cards: Vec<CardEvidence>,
    pub success: bool,
}

impl AppContext {
    /// `ask(question) -> AskResponse` (spec §6).
    pub async fn ask(&self, question: impl Into<String>) -> AskResponse {
        let result = self.graph().run(Uuid::new_v4(), question.into()).await;
        AskResponse {
            answer: result.answer,
            tools_used: result.tools_used.iter().map(|id| id.as_str().to_string()).collect(),
            citations: result.citations,
            diagnostics: Diagnostics {
                agent_timings: result.agent_timings,
                judge_report: result.judge_report,
                stale_meta: result.issues.iter().any(|i| i.contains("stale")),
            },
            success: result.success,
        }
    }

    /// `validate_deck(decklist, format, commander?) -> DeckValidateResponse`
    /// (spec §6). Bypasses the graph entirely: parses the decklist directly
    /// and runs the validator against freshly fetched card evidence.
    pub async fn validate_deck(
        &self,
        decklist: &str,
        format: &str,
        commander: Option<&str>,
    ) -> DeckValidateResponse {
        let (deck, mut warnings) = parse_decklist(decklist, format, commander);

        let mut names: Vec<String> = deck.mainboard.keys().chain(deck.sideboard.keys()).cloned().collect();
        if let Some(commander_name) = &deck.commander {
            names.push(commander_name.clone());
        }
        names.sort();
        names.dedup();

        let deps = self.graph().deps();
        let fetches = compare_multiple_cards(&deps.tools, &names).await;
        let mut card_lookup: HashMap<String, CardEvidence> = HashMap::new();
        for (name, result) in names.into_iter().zip(fetches) {
            match result {
                Ok(card) => {
                    card_lookup.insert(name.trim().to_ascii_lowercase(), card);
                }
                Err(error) => {
                    warnings.push(format!("card \"{name}\": {}", error.user_message()));
                }
            }
        }

        let DeckValidationResult { is_legal, errors, warnings: validator_warnings, total_cards } =
            DeckValidator.validate(&deck, &card_lookup);
        warnings.extend(validator_warnings);

        DeckValidateResponse { is_legal, format: deck.format, total_cards, errors, warnings }
    }

    /// `search_cards(filters) -> CardSearchResponse` (spec §6).
    pub async fn search_cards(&self, filters: &CardSearchFilters) -> CardSearchResponse {
        let deps = self.graph().deps();
        match search_cards_by_criteria(&deps.tools, filters).await {
            Ok(cards) => CardSearchResponse { total_cards: cards.len(), cards, success: true },
            Err(_) => CardSearchResponse { total_cards: 0, cards: Vec::new(), success: false },
        }
    }

    /// `meta_get(format) -> snapshot | not-found` (spec §6). Reads the cache
    /// only; never issues a web search.
    pub async fn meta_get(&self, format: &str) -> Option<MetaEvidence> {
        match self.graph().deps().meta_cache.get(&format.to_string()).await {
            TtlLookup::Fresh(evidence) => Some(evidence),
            TtlLookup::Stale(mut evidence) => {
                evidence.stale = true;
                Some(evidence)
            }
            TtlLookup::Miss => None,
        }
    }

    /// `meta_refresh(format) -> snapshot` (spec §6). Always issues a fresh
    /// web search and overwrites the cached snapshot.
    pub async fn meta_refresh(&self, format: &str) -> Result<MetaEvidence, AgentError> {
        let deps = self.graph().deps();
        let sources = search_mtg_meta(&deps.tools, format, 5).await?;
        let evidence = MetaEvidence {
            format: format.to_string(),
            snapshot_date: chrono::Utc::now(),
            summary: format!("{} metagame source(s) found", sources.len()),
            sources,
            stale: false,
        };
        deps.meta_cache.insert(format.to_string(), evidence.clone()).await;
        Ok(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stack_sage_cards::{CardSource, CardSourceError};
    use stack_sage_config::AppConfig;
    use stack_sage_contracts::{CardSearchFilters, Legality};

    use crate::context::Endpoints;

    struct KnownCardSource;

    #[async_trait::async_trait]
    impl CardSource for KnownCardSource {
        async fn fetch_card(&self, name: &str) -> Result<CardEvidence, CardSourceError> {
            let mut legalities = HashMap::new();
            legalities.insert("modern".to_string(), Legality::Legal);
            Ok(CardEvidence {
                name: name.to_string(),
                mana_cost: "{R}".into(),
                type_line: if name.eq_ignore_ascii_case("Mountain") {
                    "Basic Land — Mountain".into()
                } else {
                    "Instant".into()
                },
                oracle_text: "...".into(),
                power: None,
                toughness: None,
                legalities,
                rulings: vec![],
                set: "2XM".into(),
                collector_number: "1".into(),
                color_identity: vec![],
            })
        }

        async fn search_by_criteria(&self, _: &CardSearchFilters) -> Result<Vec<CardEvidence>, CardSourceError> {
            Ok(vec![])
        }
    }

    fn test_endpoints() -> Endpoints {
        Endpoints {
            scryfall_base_url: "https://example.test".into(),
            embedding_endpoint: None,
            llm_api_base: "https://example.test".into(),
            llm_api_key: "key".into(),
            meta_search_endpoint: None,
        }
    }

    fn test_context() -> AppContext {
        AppContext::new(AppConfig::default(), test_endpoints())
    }

    fn test_context_with_known_cards() -> AppContext {
        AppContext::with_card_source(AppConfig::default(), test_endpoints(), |_| Arc::new(KnownCardSource))
    }

    #[tokio::test]
    async fn validates_a_decklist_against_known_cards() {
        let ctx = test_context_with_known_cards();
        let response = ctx.validate_deck("5 Lightning Bolt\n55 Mountain", "modern", None).await;
        assert!(!response.is_legal);
        assert!(response.errors.iter().any(|e| e.contains("too many copies")));
    }

    #[tokio::test]
    async fn empty_question_produces_a_polite_refusal() {
        let ctx = test_context();
        let response = ctx.ask("").await;
        assert!(response.answer.to_ascii_lowercase().contains("ask a question"));
    }

    #[tokio::test]
    async fn meta_get_misses_before_any_refresh() {
        let ctx = test_context();
        assert!(ctx.meta_get("modern").await.is_none());
    }

    #[tokio::test]
    async fn card_search_rejects_empty_filters() {
        let ctx = test_context();
        let response = ctx.search_cards(&CardSearchFilters::default()).await;
        assert!(!response.success);
    }
}
