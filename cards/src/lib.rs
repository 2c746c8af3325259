//! Card Source Adapter: live card lookup and attribute search against
//! Scryfall, in front of a bounded LRU cache (spec §4.1).

pub mod adapter;
pub mod error;
pub mod query_builder;
pub mod source;

pub use adapter::CardSourceAdapter;
pub use error::CardSourceError;
pub use source::{CardSource, ScryfallSource};
