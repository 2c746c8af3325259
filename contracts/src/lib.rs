//! Shared types and error taxonomy for the Stack Sage agent core.
//!
//! Every dictionary-shaped piece of state the orchestration core passes
//! around is a tagged record here instead: unknown keys are a compile error,
//! not a runtime surprise (spec §9, "dynamically typed, dictionary-shaped
//! state").

pub mod error;
pub mod evidence;
pub mod filters;
pub mod ordered_set;
pub mod state;

pub use error::AgentError;
pub use evidence::{
    CardEvidence, Citation, Deck, DeckEvidence, DeckValidationResult, Evidence, EvidenceKind,
    Legality, MetaEvidence, MetaSource, RuleEvidence,
};
pub use filters::{CardSearchFilters, Comparison};
pub use ordered_set::OrderedSet;
pub use state::{AgentContext, AgentId, AgentState, Intent, JudgeReport, MissingContextKind};
