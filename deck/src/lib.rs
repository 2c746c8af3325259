//! Decklist parsing and per-format Deck Validator (spec §4.8).

pub mod parser;
pub mod validator;

pub use parser::{parse_decklist, serialize_decklist};
pub use validator::DeckValidator;
