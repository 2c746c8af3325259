//! Tool Surface (spec §4.3): pure, stateless operations backed by the Card
//! Source Adapter, Rules Index, and web meta search, reached through a
//! `ToolRegistry` agents receive by dependency injection.

pub mod meta_search;
pub mod operations;
pub mod registry;

pub use meta_search::{MetaSearchClient, NotConfiguredMetaSearch, WebMetaSearchClient};
pub use operations::{
    check_format_legality, compare_multiple_cards, cross_reference_rules, lookup_card,
    search_cards_by_criteria, search_mtg_meta, search_rules, search_rules_bm25,
    search_rules_hybrid,
};
pub use registry::{ToolRegistry, CARD_FETCH_PARALLELISM};
