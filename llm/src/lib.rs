//! Shared LLM client: cached handles keyed by (model, temperature), plus the
//! strict-JSON contract helper Planner relies on.

pub mod cache;
pub mod client;
pub mod json_contract;

pub use cache::LlmClientCache;
pub use client::{LlmClient, Message, Role};
#[cfg(any(test, feature = "test-util"))]
pub use client::FakeLlmClient;
pub use json_contract::call_with_json_contract;
