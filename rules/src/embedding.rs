//! Embedding providers (spec §4.2, §6 `EMBEDDING_MODE`). Only the vector
//! dimensionality differs between modes; the index records whichever was
//! used at build time and refuses to load on a mismatch.

use async_trait::async_trait;
use stack_sage_config::EmbeddingMode;
use stack_sage_contracts::AgentError;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError>;
    fn dimensions(&self) -> usize;
    fn mode(&self) -> EmbeddingMode;
}

/// Calls a hosted embedding endpoint.
pub struct HostedEmbeddingProvider {
    http: reqwest::Client,
    endpoint: String,
}

impl HostedEmbeddingProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HostedEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            input: &'a str,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            embedding: Vec<f32>,
        }

        let response = self
            .http
            .post(&self.endpoint)
            .json(&Req { input: text })
            .send()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AgentError::UpstreamUnavailable(format!(
                "embedding endpoint returned {}",
                response.status()
            )));
        }

        let parsed: Resp = response
            .json()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("malformed embedding response: {e}")))?;
        Ok(parsed.embedding)
    }

    fn dimensions(&self) -> usize {
        EmbeddingMode::Hosted.dimensions()
    }

    fn mode(&self) -> EmbeddingMode {
        EmbeddingMode::Hosted
    }
}

/// A deterministic, offline, lower-dimensionality embedder: hashes
/// overlapping character trigrams into a fixed-size vector and L2-normalizes.
/// Used for `EMBEDDING_MODE=local` and in tests, since it needs no network
/// access or model download.
pub struct LocalEmbeddingProvider {
    dims: usize,
}

impl LocalEmbeddingProvider {
    pub fn new() -> Self {
        Self { dims: EmbeddingMode::Local.dimensions() }
    }
}

impl Default for LocalEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError> {
        let mut vector = vec![0.0f32; self.dims];
        let normalized = text.to_ascii_lowercase();
        let chars: Vec<char> = normalized.chars().collect();

        if chars.is_empty() {
            return Ok(vector);
        }

        for window in chars.windows(3.min(chars.len()).max(1)) {
            let trigram: String = window.iter().collect();
            let hash = fnv1a(trigram.as_bytes());
            let bucket = (hash as usize) % self.dims;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn mode(&self) -> EmbeddingMode {
        EmbeddingMode::Local
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_embeddings_are_deterministic_and_normalized() {
        let provider = LocalEmbeddingProvider::new();
        let a = provider.embed("creatures you control gain indestructible").await.unwrap();
        let b = provider.embed("creatures you control gain indestructible").await.unwrap();
        assert_eq!(a, b);
        let norm = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4 || norm == 0.0);
    }

    #[tokio::test]
    async fn distinct_text_yields_distinct_embeddings() {
        let provider = LocalEmbeddingProvider::new();
        let a = provider.embed("replacement effect").await.unwrap();
        let b = provider.embed("state-based action").await.unwrap();
        assert_ne!(a, b);
    }
}
