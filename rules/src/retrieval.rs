//! Hybrid (vector + BM25) retrieval with a query cache (spec §4.2).

use std::collections::HashMap;
use std::sync::Arc;

use stack_sage_caching::BoundedCache;
use stack_sage_contracts::{AgentError, RuleEvidence};

use crate::bm25::Bm25Index;
use crate::embedding::EmbeddingProvider;
use crate::vector_store::VectorStore;

/// Default number of results, chosen as the single value replacing the
/// source's inconsistent k=5/6/8 call sites (spec §9 open question,
/// resolved: 8, "matching the most-tuned path").
pub const DEFAULT_K: usize = 8;

/// Weight given to the vector score in the combined ranking (spec §4.2).
pub const HYBRID_ALPHA: f32 = 0.6;

pub struct RuleText {
    pub rule_id: String,
    pub text: String,
}

pub struct RulesIndex {
    vector_store: VectorStore,
    bm25: Bm25Index,
    texts: HashMap<String, String>,
    embedder: Arc<dyn EmbeddingProvider>,
    query_cache: BoundedCache<(String, usize), Vec<RuleEvidence>>,
}

impl RulesIndex {
    /// Build from already-chunked rule text. Embeddings are computed for
    /// every chunk up front; both the vector store and the BM25 index are
    /// populated so hybrid queries never need to fall back to one retriever.
    pub async fn build(
        chunks: Vec<RuleText>,
        embedder: Arc<dyn EmbeddingProvider>,
        query_cache_capacity: usize,
    ) -> Result<Self, AgentError> {
        let mut vector_store = VectorStore::new(embedder.dimensions());
        let mut bm25 = Bm25Index::new();
        let mut texts = HashMap::new();

        for chunk in chunks {
            let embedding = embedder.embed(&chunk.text).await?;
            vector_store.insert(chunk.rule_id.clone(), embedding);
            bm25.insert(chunk.rule_id.clone(), &chunk.text);
            texts.insert(chunk.rule_id.clone(), chunk.text);
        }

        Ok(Self {
            vector_store,
            bm25,
            texts,
            embedder,
            query_cache: BoundedCache::new(query_cache_capacity),
        })
    }

    fn normalize(query: &str) -> String {
        query.trim().to_ascii_lowercase()
    }

    /// Vector-only search (spec §4.3 `search_rules`).
    pub async fn search_vector(&self, query: &str, k: usize) -> Result<Vec<RuleEvidence>, AgentError> {
        let embedding = self.embedder.embed(query).await?;
        let hits = self.vector_store.search(&embedding, k);
        Ok(hits
            .into_iter()
            .map(|(rule_id, score)| self.to_evidence(rule_id, score))
            .collect())
    }

    /// Keyword-only search (spec §4.3 `search_rules_bm25`).
    pub fn search_bm25(&self, query: &str, k: usize) -> Vec<RuleEvidence> {
        self.bm25
            .search(query, k)
            .into_iter()
            .map(|(rule_id, score)| self.to_evidence(rule_id, normalize_bm25_score(score)))
            .collect()
    }

    /// Hybrid retrieval: union vector + BM25 candidates, re-score by
    /// `α·vector + (1-α)·bm25` (max-normalized per retriever), dedupe on rule
    /// id keeping the highest score, return the top `k` scoring at least
    /// `min_score` (spec §4.2). Empty result is not an error.
    pub async fn search_hybrid(
        &self,
        query: &str,
        k: usize,
        min_score: f32,
    ) -> Result<Vec<RuleEvidence>, AgentError> {
        let normalized = Self::normalize(query);
        let cache_key = (normalized.clone(), k);
        if let Some(cached) = self.query_cache.get(&cache_key).await {
            return Ok(cached.into_iter().filter(|r| r.score >= min_score).collect());
        }

        let embedding = self.embedder.embed(&normalized).await?;
        let vector_hits = self.vector_store.search(&embedding, k.max(DEFAULT_K));
        let bm25_hits = self.bm25.search(&normalized, k.max(DEFAULT_K));

        let vector_max = vector_hits.iter().map(|(_, s)| *s).fold(0.0_f32, f32::max).max(f32::EPSILON);
        let bm25_max = bm25_hits.iter().map(|(_, s)| *s).fold(0.0_f32, f32::max).max(f32::EPSILON);

        let mut combined: HashMap<String, f32> = HashMap::new();
        for (rule_id, score) in &vector_hits {
            let normalized_score = HYBRID_ALPHA * (score / vector_max);
            combined
                .entry(rule_id.clone())
                .and_modify(|s| *s = s.max(normalized_score))
                .or_insert(normalized_score);
        }
        for (rule_id, score) in &bm25_hits {
            let normalized_score = (1.0 - HYBRID_ALPHA) * (score / bm25_max);
            combined
                .entry(rule_id.clone())
                .and_modify(|s| *s += normalized_score)
                .or_insert(normalized_score);
        }

        let mut ranked: Vec<(String, f32)> = combined.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        let evidence: Vec<RuleEvidence> = ranked
            .into_iter()
            .map(|(rule_id, score)| self.to_evidence(rule_id, score))
            .collect();

        self.query_cache.insert(cache_key, evidence.clone()).await;

        Ok(evidence.into_iter().filter(|r| r.score >= min_score).collect())
    }

    fn to_evidence(&self, rule_id: String, score: f32) -> RuleEvidence {
        let text = self.texts.get(&rule_id).cloned().unwrap_or_default();
        RuleEvidence { rule_id, text, score: score.clamp(0.0, 1.0) }
    }

    pub fn len(&self) -> usize {
        self.vector_store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector_store.is_empty()
    }
}

/// BM25 scores are unbounded; squash into roughly `[0, 1]` for display and
/// for the `min_score` filter on the vector-only path.
fn normalize_bm25_score(raw: f32) -> f32 {
    raw / (raw + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::LocalEmbeddingProvider;

    async fn sample_index() -> RulesIndex {
        let chunks = vec![
            RuleText {
                rule_id: "702.8a".into(),
                text: "Deathtouch is a static ability.".into(),
            },
            RuleText {
                rule_id: "104.3a".into(),
                text: "A player loses the game if that player's life total is 0 or less.".into(),
            },
            RuleText {
                rule_id: "601.2a".into(),
                text: "To cast a spell, a player follows the steps in order.".into(),
            },
        ];
        RulesIndex::build(chunks, Arc::new(LocalEmbeddingProvider::new()), 100)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn hybrid_search_returns_ranked_results() {
        let index = sample_index().await;
        let results = index.search_hybrid("casting a spell", 8, 0.0).await.unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().any(|r| r.rule_id == "601.2a"));
    }

    #[tokio::test]
    async fn repeated_query_within_cache_window_is_identical() {
        let index = sample_index().await;
        let first = index.search_hybrid("deathtouch", 8, 0.0).await.unwrap();
        let second = index.search_hybrid("deathtouch", 8, 0.0).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let index = sample_index().await;
        let results = index.search_hybrid("zzz nonexistent qqq", 8, 0.95).await.unwrap();
        assert!(results.is_empty());
    }
}
