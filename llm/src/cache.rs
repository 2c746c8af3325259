//! Cached LLM client handles keyed by (model, temperature) (spec §2, §6:
//! "LLM-handle unbounded (keyed by (model,temperature); tiny cardinality)").

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::{HttpLlmClient, LlmClient};

/// Temperature is rounded to two decimal places before hashing so that
/// floating-point noise doesn't fragment the cache into near-duplicate keys.
fn temperature_key(temperature: f32) -> i32 {
    (temperature * 100.0).round() as i32
}

pub struct LlmClientCache {
    api_base: String,
    api_key: String,
    handles: Mutex<HashMap<(String, i32), Arc<dyn LlmClient>>>,
}

impl LlmClientCache {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Cardinality is tiny (at most a few models × a handful of temperature
    /// points per request), so this cache is never evicted.
    pub async fn get_or_create(&self, model: &str, temperature: f32) -> Arc<dyn LlmClient> {
        let key = (model.to_string(), temperature_key(temperature));
        let mut handles = self.handles.lock().await;
        handles
            .entry(key)
            .or_insert_with(|| {
                Arc::new(HttpLlmClient::new(
                    self.api_base.clone(),
                    self.api_key.clone(),
                    model.to_string(),
                ))
            })
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_model_and_temperature_share_a_handle() {
        let cache = LlmClientCache::new("https://example.test", "key");
        let a = cache.get_or_create("gpt-4o-mini", 0.1).await;
        let b = cache.get_or_create("gpt-4o-mini", 0.1).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn distinct_temperature_gets_distinct_handle() {
        let cache = LlmClientCache::new("https://example.test", "key");
        cache.get_or_create("gpt-4o-mini", 0.0).await;
        cache.get_or_create("gpt-4o-mini", 0.1).await;
        assert_eq!(cache.len().await, 2);
    }
}
