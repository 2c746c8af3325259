//! `ToolRegistry`: the dependency-injection seam agents receive instead of
//! reaching for global singletons (spec §9: "decorator-based tool
//! registration → a registry object... constructed at module init; agents
//! receive the registry by dependency injection to allow test doubles").

use std::sync::Arc;

use stack_sage_cards::CardSourceAdapter;
use stack_sage_rules::RulesIndexHandle;

use crate::meta_search::MetaSearchClient;

/// Bound on concurrent fan-out for multi-card tool calls (spec §5: "a small
/// parallelism bound (default 4)").
pub const CARD_FETCH_PARALLELISM: usize = 4;

pub struct ToolRegistry {
    pub cards: Arc<CardSourceAdapter>,
    pub rules: Arc<RulesIndexHandle>,
    pub meta_search: Arc<dyn MetaSearchClient>,
}

impl ToolRegistry {
    pub fn new(
        cards: Arc<CardSourceAdapter>,
        rules: Arc<RulesIndexHandle>,
        meta_search: Arc<dyn MetaSearchClient>,
    ) -> Self {
        Self { cards, rules, meta_search }
    }
}
