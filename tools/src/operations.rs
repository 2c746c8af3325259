//! The tool surface agents invoke (spec §4.3). Every operation is pure from
//! the caller's perspective: inputs in, a structured result out. Tools never
//! mutate `AgentState` directly — callers place the returned value into
//! state themselves.

use futures::stream::{self, StreamExt};
use stack_sage_contracts::{AgentError, CardEvidence, CardSearchFilters, Legality, MetaSource, RuleEvidence};

use crate::registry::{ToolRegistry, CARD_FETCH_PARALLELISM};

/// `lookup_card(name)` (spec §4.3).
pub async fn lookup_card(registry: &ToolRegistry, name: &str) -> Result<CardEvidence, AgentError> {
    registry.cards.fetch_card(name).await
}

/// `search_rules(query, k)` — vector only (spec §4.3).
pub async fn search_rules(
    registry: &ToolRegistry,
    query: &str,
    k: usize,
) -> Result<Vec<RuleEvidence>, AgentError> {
    registry.rules.search_vector(query, k).await
}

/// `search_rules_bm25(query, k)` — keyword only (spec §4.3).
pub fn search_rules_bm25(
    registry: &ToolRegistry,
    query: &str,
    k: usize,
) -> Result<Vec<RuleEvidence>, AgentError> {
    registry.rules.search_bm25(query, k)
}

/// `search_rules_hybrid(query, k, min_score)` — the default retrieval path
/// (spec §4.3, §4.2).
pub async fn search_rules_hybrid(
    registry: &ToolRegistry,
    query: &str,
    k: usize,
    min_score: f32,
) -> Result<Vec<RuleEvidence>, AgentError> {
    registry.rules.search_hybrid(query, k).await.map(|results| {
        results.into_iter().filter(|r| r.score >= min_score).collect()
    })
}

/// `compare_multiple_cards(names[])`: parallel lookups bounded to
/// [`CARD_FETCH_PARALLELISM`] concurrent requests, returning an aligned list
/// (one result per input name, in input order) so a failure on one name
/// doesn't drop the alignment for the rest (spec §4.3, §4.5).
pub async fn compare_multiple_cards(
    registry: &ToolRegistry,
    names: &[String],
) -> Vec<Result<CardEvidence, AgentError>> {
    stream::iter(names.iter())
        .map(|name| async move { registry.cards.fetch_card(name).await })
        .buffered(CARD_FETCH_PARALLELISM)
        .collect()
        .await
}

/// `check_format_legality(name, format)` (spec §4.3, §4.1).
pub async fn check_format_legality(
    registry: &ToolRegistry,
    name: &str,
    format: &str,
) -> Result<Legality, AgentError> {
    registry.cards.check_legality(name, format).await
}

/// `search_cards_by_criteria(filters)` (spec §4.3, §4.1).
pub async fn search_cards_by_criteria(
    registry: &ToolRegistry,
    filters: &CardSearchFilters,
) -> Result<Vec<CardEvidence>, AgentError> {
    registry.cards.search_by_criteria(filters).await
}

/// `search_mtg_meta(query, max_results)` — degrades to a
/// `ToolMisconfigured`-flavored "not-configured" error rather than a
/// confident-looking empty result when no search credential is wired in
/// (spec §4.3, §4.7, §6).
pub async fn search_mtg_meta(
    registry: &ToolRegistry,
    query: &str,
    max_results: usize,
) -> Result<Vec<MetaSource>, AgentError> {
    registry.meta_search.search(query, max_results).await
}

/// `cross_reference_rules(topic_a, topic_b)`: two hybrid searches joined
/// (spec §4.3).
pub async fn cross_reference_rules(
    registry: &ToolRegistry,
    topic_a: &str,
    topic_b: &str,
    k: usize,
) -> Result<(Vec<RuleEvidence>, Vec<RuleEvidence>), AgentError> {
    let a = registry.rules.search_hybrid(topic_a, k).await?;
    let b = registry.rules.search_hybrid(topic_b, k).await?;
    Ok((a, b))
}
