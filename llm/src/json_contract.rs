//! Strict-JSON LLM return contract with a single retry on malformed output
//! (spec §4.4, §9: "LLM JSON-return contract... enforce with strict parsing
//! and single retry; on failure, deterministic fallback; never let malformed
//! JSON propagate").

use serde::de::DeserializeOwned;

use crate::client::{LlmClient, Message};

/// Strip a markdown code fence if the model wrapped its JSON in one, since
/// "respond with ONLY a JSON object" is routinely ignored in practice.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.trim_end_matches("```").trim())
        .unwrap_or(trimmed)
}

/// Call `client` with `messages` and parse the response as `T`. On a parse
/// failure, retries once with the same messages; if the retry also fails to
/// parse, returns `None` so the caller can apply its deterministic fallback
/// instead of propagating malformed JSON.
pub async fn call_with_json_contract<T: DeserializeOwned>(
    client: &dyn LlmClient,
    messages: &[Message],
    temperature: f32,
) -> Option<T> {
    for attempt in 0..2 {
        let Ok(raw) = client.complete(messages, temperature).await else {
            continue;
        };
        let cleaned = strip_code_fence(&raw);
        match serde_json::from_str::<T>(cleaned) {
            Ok(value) => return Some(value),
            Err(error) => {
                tracing::warn!(attempt, %error, "planner JSON contract violated, retrying");
            }
        }
    }
    None
}
