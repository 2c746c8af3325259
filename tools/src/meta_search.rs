//! Web meta search: degrades to a `"not-configured"` notice rather than an
//! error when `META_SEARCH_CREDENTIAL` is absent (spec §4.3, §4.7, §6).

use async_trait::async_trait;
use stack_sage_contracts::{AgentError, MetaSource};

#[async_trait]
pub trait MetaSearchClient: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<MetaSource>, AgentError>;
}

/// Calls an external web search endpoint, scoped to metagame queries.
pub struct WebMetaSearchClient {
    http: reqwest::Client,
    endpoint: String,
    credential: String,
}

impl WebMetaSearchClient {
    pub fn new(endpoint: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            credential: credential.into(),
        }
    }
}

#[async_trait]
impl MetaSearchClient for WebMetaSearchClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<MetaSource>, AgentError> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            query: &'a str,
            max_results: usize,
        }
        #[derive(serde::Deserialize)]
        struct Hit {
            title: String,
            url: String,
            #[serde(default)]
            snippet: String,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            #[serde(default)]
            results: Vec<Hit>,
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.credential)
            .json(&Req { query, max_results })
            .send()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("meta search request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AgentError::UpstreamUnavailable(format!(
                "meta search endpoint returned {}",
                response.status()
            )));
        }

        let parsed: Resp = response
            .json()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("malformed meta search response: {e}")))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|h| MetaSource { title: h.title, url: h.url, snippet: h.snippet })
            .collect())
    }
}

/// Used whenever `META_SEARCH_CREDENTIAL` is absent. Every call returns
/// `ToolMisconfigured` so the Meta Agent can surface "not configured" rather
/// than a confident-looking empty result (spec §6).
pub struct NotConfiguredMetaSearch;

#[async_trait]
impl MetaSearchClient for NotConfiguredMetaSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<MetaSource>, AgentError> {
        Err(AgentError::ToolMisconfigured(
            "metagame web search".to_string(),
        ))
    }
}
