//! LLM client abstraction, modeled on an OpenAI-compatible chat completion API
//! (spec §6: `LLM_MODEL`, `LLM_TEMPERATURE`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stack_sage_contracts::AgentError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Abstraction over the chat-completion call every agent makes. A trait
/// object (not a concrete struct) so tests substitute an in-memory fake
/// instead of an external endpoint (spec §9: "global mutable singletons...
/// explicit components with a documented lifecycle... tests may substitute
/// fakes").
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, AgentError>;
    fn model_name(&self) -> &str;
}

/// An OpenAI-compatible HTTP client.
pub struct HttpLlmClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl HttpLlmClient {
    pub fn new(api_base: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, AgentError> {
        let body = ChatRequest { model: &self.model, messages, temperature };
        let retry_config = stack_sage_resilience::RetryConfig::default();
        let response = stack_sage_resilience::retry(
            retry_config,
            |_: &AgentError| true,
            || async {
                self.http
                    .post(format!("{}/chat/completions", self.api_base))
                    .bearer_auth(&self.api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| AgentError::UpstreamUnavailable(format!("LLM request failed: {e}")))
            },
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::UpstreamUnavailable(format!(
                "LLM endpoint returned {status}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::UpstreamUnavailable(format!("malformed LLM response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentError::UpstreamUnavailable("LLM returned no choices".into()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// An in-memory client for tests: returns scripted responses in order.
#[cfg(any(test, feature = "test-util"))]
pub struct FakeLlmClient {
    responses: std::sync::Mutex<std::collections::VecDeque<String>>,
    model: String,
}

#[cfg(any(test, feature = "test-util"))]
impl FakeLlmClient {
    pub fn new(model: impl Into<String>, responses: Vec<String>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into()),
            model: model.into(),
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn complete(&self, _messages: &[Message], _temperature: f32) -> Result<String, AgentError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::UpstreamUnavailable("fake client exhausted".into()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
