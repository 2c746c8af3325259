//! The Card Source Adapter (spec §4.1): case-folded cache lookup in front of
//! the raw card source, with fuzzy-miss retry and search fan-in.

use std::sync::Arc;

use stack_sage_caching::BoundedCache;
use stack_sage_contracts::{AgentError, CardEvidence, CardSearchFilters, Legality};
use stack_sage_resilience::RetryConfig;

use crate::error::CardSourceError;
use crate::source::CardSource;

const SEARCH_RESULT_CAP: usize = 10;

pub struct CardSourceAdapter {
    source: Arc<dyn CardSource>,
    cache: BoundedCache<String, CardEvidence>,
}

impl CardSourceAdapter {
    pub fn new(source: Arc<dyn CardSource>, cache_capacity: usize) -> Self {
        Self {
            source,
            cache: BoundedCache::new(cache_capacity),
        }
    }

    /// Case-folded cache lookup; on miss, fetches from the card service and
    /// inserts into the LRU cache (spec §4.1). A second `fetch_card` call for
    /// the same name performs no network I/O (spec §8 idempotence).
    pub async fn fetch_card(&self, name: &str) -> Result<CardEvidence, AgentError> {
        let key = name.trim().to_ascii_lowercase();
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let retry_config = RetryConfig::default();
        let source = &self.source;
        let card = stack_sage_resilience::retry(
            retry_config,
            |error: &CardSourceError| matches!(error, CardSourceError::Upstream(_)),
            || source.fetch_card(name),
        )
        .await
        .map_err(AgentError::from)?;

        self.cache.insert(key, card.clone()).await;
        Ok(card)
    }

    /// At least one filter must be set, results capped at 10 and ordered by
    /// whatever popularity ranking the card source reports (spec §4.1). Never
    /// cached: the filter space is open-ended.
    pub async fn search_by_criteria(
        &self,
        filters: &CardSearchFilters,
    ) -> Result<Vec<CardEvidence>, AgentError> {
        if filters.is_empty() {
            return Err(AgentError::InvalidQuery(
                "at least one search filter must be set".into(),
            ));
        }

        let mut results = self.source.search_by_criteria(filters).await?;
        results.truncate(SEARCH_RESULT_CAP);
        Ok(results)
    }

    /// Legality is read straight off the cached/fetched card; `unknown` means
    /// the card source has no opinion for that format (spec §4.1).
    pub async fn check_legality(&self, name: &str, format: &str) -> Result<Legality, AgentError> {
        let card = self.fetch_card(name).await?;
        Ok(card.legality_for(format))
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct CountingFakeSource {
        calls: AtomicU32,
        card: CardEvidence,
    }

    fn sample_card(name: &str) -> CardEvidence {
        let mut legalities = std::collections::HashMap::new();
        legalities.insert("commander".to_string(), Legality::Banned);
        CardEvidence {
            name: name.to_string(),
            mana_cost: "{0}".into(),
            type_line: "Artifact".into(),
            oracle_text: "...".into(),
            power: None,
            toughness: None,
            legalities,
            rulings: vec![],
            set: "LEA".into(),
            collector_number: "123".into(),
            color_identity: vec![],
        }
    }

    #[async_trait]
    impl CardSource for CountingFakeSource {
        async fn fetch_card(&self, _name: &str) -> Result<CardEvidence, CardSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.card.clone())
        }

        async fn search_by_criteria(
            &self,
            _filters: &CardSearchFilters,
        ) -> Result<Vec<CardEvidence>, CardSourceError> {
            Ok(vec![self.card.clone()])
        }
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let source = Arc::new(CountingFakeSource {
            calls: AtomicU32::new(0),
            card: sample_card("Black Lotus"),
        });
        let adapter = CardSourceAdapter::new(source.clone(), 10);

        let first = adapter.fetch_card("Black Lotus").await.unwrap();
        let second = adapter.fetch_card("black lotus").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn legality_reads_the_fetched_card() {
        let source = Arc::new(CountingFakeSource {
            calls: AtomicU32::new(0),
            card: sample_card("Black Lotus"),
        });
        let adapter = CardSourceAdapter::new(source, 10);
        let legality = adapter.check_legality("Black Lotus", "commander").await.unwrap();
        assert_eq!(legality, Legality::Banned);
    }

    #[tokio::test]
    async fn empty_filters_are_rejected() {
        let source = Arc::new(CountingFakeSource {
            calls: AtomicU32::new(0),
            card: sample_card("Anything"),
        });
        let adapter = CardSourceAdapter::new(source, 10);
        let result = adapter.search_by_criteria(&CardSearchFilters::default()).await;
        assert!(matches!(result, Err(AgentError::InvalidQuery(_))));
    }
}
