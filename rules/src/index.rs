//! Ties chunking, embedding, and the two retrievers into a single index with
//! a build/query lifecycle (spec §4.2: "On index not built: fail with
//! `IndexUnavailable`").

use std::sync::Arc;

use tokio::sync::RwLock;

use stack_sage_config::EmbeddingMode;
use stack_sage_contracts::{AgentError, RuleEvidence};

use crate::chunking::chunk_comprehensive_rules;
use crate::embedding::EmbeddingProvider;
use crate::retrieval::{RuleText, RulesIndex as BuiltIndex};

const QUERY_CACHE_CAPACITY: usize = 100;

/// Public handle to the Comprehensive Rules retrieval index.
///
/// Building is expensive (one embedding call per chunk) and is done once at
/// startup; queries borrow the built index read-only. `RwLock` rather than a
/// `Mutex` because builds are rare and queries are frequent and concurrent.
pub struct RulesIndexHandle {
    built: RwLock<Option<BuiltIndex>>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RulesIndexHandle {
    /// An unbuilt handle. Every query returns [`AgentError::IndexUnavailable`]
    /// until [`Self::build_from_source`] succeeds.
    pub fn unbuilt(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { built: RwLock::new(None), embedder }
    }

    /// Chunk and embed the raw Comprehensive Rules document, replacing
    /// whatever index was previously built.
    pub async fn build_from_source(&self, source: &str) -> Result<usize, AgentError> {
        let chunks = chunk_comprehensive_rules(source)
            .into_iter()
            .map(|c| RuleText { rule_id: c.rule_id, text: c.text })
            .collect::<Vec<_>>();

        if chunks.is_empty() {
            return Err(AgentError::IndexUnavailable(
                "comprehensive rules source produced zero chunks".into(),
            ));
        }

        let count = chunks.len();
        let built = BuiltIndex::build(chunks, self.embedder.clone(), QUERY_CACHE_CAPACITY).await?;

        let mut guard = self.built.write().await;
        *guard = Some(built);
        Ok(count)
    }

    pub fn embedding_mode(&self) -> EmbeddingMode {
        self.embedder.mode()
    }

    pub fn is_built(&self) -> bool {
        self.built.try_read().map(|g| g.is_some()).unwrap_or(false)
    }

    pub async fn search_hybrid(&self, query: &str, k: usize) -> Result<Vec<RuleEvidence>, AgentError> {
        let guard = self.built.read().await;
        let index = guard
            .as_ref()
            .ok_or_else(|| AgentError::IndexUnavailable("rules index has not been built".into()))?;
        index.search_hybrid(query, k, 0.0).await
    }

    pub async fn search_vector(&self, query: &str, k: usize) -> Result<Vec<RuleEvidence>, AgentError> {
        let guard = self.built.read().await;
        let index = guard
            .as_ref()
            .ok_or_else(|| AgentError::IndexUnavailable("rules index has not been built".into()))?;
        index.search_vector(query, k).await
    }

    pub fn search_bm25(&self, query: &str, k: usize) -> Result<Vec<RuleEvidence>, AgentError> {
        let guard = self
            .built
            .try_read()
            .map_err(|_| AgentError::InternalInvariantBreach("rules index is mid-rebuild".into()))?;
        let index = guard
            .as_ref()
            .ok_or_else(|| AgentError::IndexUnavailable("rules index has not been built".into()))?;
        Ok(index.search_bm25(query, k))
    }
}
