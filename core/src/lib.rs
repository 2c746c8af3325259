//! External interfaces (spec §6/§11): `ask`, `validate_deck`, `search_cards`,
//! `meta_get`/`meta_refresh`, built around an [`AppContext`] composition root
//! that bundles every process-wide component behind dependency injection.

pub mod context;
pub mod interfaces;
pub mod logging;

pub use context::{AppContext, Endpoints};
pub use interfaces::{AskResponse, CardSearchResponse, DeckValidateResponse, Diagnostics};
pub use logging::init_tracing;
