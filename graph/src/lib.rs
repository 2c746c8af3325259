//! Multi-agent graph (spec §4.12): an explicit state machine driving Planner
//! → specialists → Interaction → Judge → Finalizer, with a recursion cap and
//! a bounded missing-context re-invocation loop.
//!
//! Not a generic graph-execution engine — `Dispatch` is a plain function that
//! owns `task_plan` head/tail dequeuing and the reinsertion counters.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use stack_sage_agents::{
    Agent, AgentDeps, CardAgent, DeckAgent, FinalizerAgent, InteractionAgent, JudgeAgent, MetaAgent,
    PlannerAgent, RulesAgent,
};
use stack_sage_contracts::{AgentError, AgentId, AgentState, Citation, JudgeReport};
use stack_sage_resilience::with_soft_timeout;
use tracing::Instrument;
use uuid::Uuid;

/// Output of a single `Graph::run` invocation (spec §6, "Ask operation").
#[derive(Debug, Clone)]
pub struct AskResult {
    pub answer: String,
    pub tools_used: Vec<AgentId>,
    pub citations: Vec<Citation>,
    pub agent_timings: HashMap<String, f64>,
    pub judge_report: JudgeReport,
    pub issues: Vec<String>,
    pub success: bool,
}

impl AskResult {
    fn finish(state: AgentState, success: bool) -> Self {
        Self {
            answer: state.final_answer.clone().unwrap_or_else(|| "No answer was produced.".to_string()),
            tools_used: state.tools_used.iter().copied().collect(),
            citations: state.citations,
            agent_timings: state.agent_timings,
            judge_report: state.judge_report,
            issues: state.issues,
            success,
        }
    }
}

/// Owns the process-wide [`AgentDeps`] and drives one request at a time
/// through the graph (spec §5: "single cooperative dispatcher per request").
pub struct Graph {
    deps: AgentDeps,
}

impl Graph {
    pub fn new(deps: AgentDeps) -> Self {
        Self { deps }
    }

    /// The process-wide components this graph was built with, so an
    /// external caller (e.g. the deck-validate/card-search interfaces) can
    /// reuse the same tool registry and caches without duplicating them.
    pub fn deps(&self) -> &AgentDeps {
        &self.deps
    }

    pub async fn run(&self, request_id: Uuid, question: String) -> AskResult {
        let mut state = AgentState::new(request_id, question);
        let node_timeout = Duration::from_secs(self.deps.config.node_timeout_secs);
        let request_budget = Duration::from_secs(self.deps.config.request_budget_secs);

        let outcome = with_soft_timeout("request", request_budget, self.drive(&mut state, node_timeout)).await;

        match outcome {
            Ok(Ok(())) => AskResult::finish(state, true),
            Ok(Err(error)) => {
                state.final_answer = Some(error.user_message());
                AskResult::finish(state, false)
            }
            Err(AgentError::Timeout { context, budget_secs }) => {
                state.issues.push(format!("{context} took longer than the {budget_secs}s budget allowed."));
                state.final_answer = Some(
                    "This is taking longer than expected; here's what I was able to confirm so far."
                        .to_string(),
                );
                AskResult::finish(state, false)
            }
            Err(other) => {
                state.final_answer = Some(other.user_message());
                AskResult::finish(state, false)
            }
        }
    }

    async fn drive(&self, state: &mut AgentState, node_timeout: Duration) -> Result<(), AgentError> {
        self.run_node(AgentId::Planner, state, node_timeout).await?;

        loop {
            if state.node_executions >= self.deps.config.recursion_cap {
                state.final_answer = Some("That question is too complex to answer right now.".to_string());
                return Ok(());
            }

            match self.dispatch(state) {
                Some(AgentId::Finalizer) | None => {
                    self.run_node(AgentId::Finalizer, state, node_timeout).await?;
                    return Ok(());
                }
                Some(id) => {
                    self.run_node(id, state, node_timeout).await?;
                }
            }
        }
    }

    /// The `Dispatch` pseudo-node (spec §4.12): if the last node left
    /// `missing_context` set and that kind hasn't already been re-invoked,
    /// prepends the specialist (and a fresh Interaction pass) to `task_plan`
    /// before popping the head. Capped at one re-invocation per kind
    /// regardless of which node raised it.
    fn dispatch(&self, state: &mut AgentState) -> Option<AgentId> {
        if let Some(kind) = state.missing_context.take() {
            let count = state.missing_context_reinvocations.entry(kind).or_insert(0);
            if *count < 1 {
                *count += 1;
                state.task_plan.push_front(AgentId::Interaction);
                state.task_plan.push_front(kind.respecialist());
            }
        }
        state.task_plan.pop_front()
    }

    async fn run_node(
        &self,
        id: AgentId,
        state: &mut AgentState,
        node_timeout: Duration,
    ) -> Result<(), AgentError> {
        state.node_executions += 1;
        state.tools_used.insert(id);

        // `agent_timings` mirrors this span's duration (spec §11: "agent_timings
        // additionally emitted as tracing span durations"); the span is also
        // what `RUST_LOG`/`VERBOSE` consumers see without reading the response.
        let span = tracing::info_span!("agent_node", agent = id.as_str(), request_id = %state.request_id);

        let started = Instant::now();
        let outcome = with_soft_timeout(id.as_str(), node_timeout, self.dispatch_run(id, state))
            .instrument(span)
            .await;
        let elapsed = started.elapsed().as_secs_f64();
        state.agent_timings.insert(id.as_str().to_string(), elapsed);

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) if error.is_fatal() => Err(error),
            Ok(Err(error)) => {
                state.issues.push(format!("{}: {}", id.as_str(), error.user_message()));
                Ok(())
            }
            Err(AgentError::Timeout { context, budget_secs }) => {
                state.issues.push(format!("{context} took longer than the {budget_secs}s budget allowed."));
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    async fn dispatch_run(&self, id: AgentId, state: &mut AgentState) -> Result<(), AgentError> {
        match id {
            AgentId::Planner => PlannerAgent.run(state, &self.deps).await,
            AgentId::Cards => CardAgent.run(state, &self.deps).await,
            AgentId::Rules => RulesAgent.run(state, &self.deps).await,
            AgentId::Meta => MetaAgent.run(state, &self.deps).await,
            AgentId::Deck => DeckAgent.run(state, &self.deps).await,
            AgentId::Interaction => InteractionAgent.run(state, &self.deps).await,
            AgentId::Judge => JudgeAgent.run(state, &self.deps).await,
            AgentId::Finalizer => FinalizerAgent.run(state, &self.deps).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stack_sage_cards::{CardSource, CardSourceAdapter, CardSourceError};
    use stack_sage_caching::TtlCache;
    use stack_sage_config::AppConfig;
    use stack_sage_contracts::{CardEvidence, CardSearchFilters};
    use stack_sage_llm::{FakeLlmClient, LlmClientCache};
    use stack_sage_rules::{LocalEmbeddingProvider, RulesIndexHandle};
    use stack_sage_tools::{NotConfiguredMetaSearch, ToolRegistry};

    struct EmptySource;

    #[async_trait::async_trait]
    impl CardSource for EmptySource {
        async fn fetch_card(&self, name: &str) -> Result<CardEvidence, CardSourceError> {
            Err(CardSourceError::NotFound(name.to_string()))
        }
        async fn search_by_criteria(&self, _: &CardSearchFilters) -> Result<Vec<CardEvidence>, CardSourceError> {
            Ok(vec![])
        }
    }

    async fn sample_graph() -> Graph {
        let cards = Arc::new(CardSourceAdapter::new(Arc::new(EmptySource), 10));
        let rules = Arc::new(RulesIndexHandle::unbuilt(Arc::new(LocalEmbeddingProvider::new())));
        rules.build_from_source("601.2a Casting a spell requires these steps.\n").await.unwrap();
        let tools = Arc::new(ToolRegistry::new(cards, rules, Arc::new(NotConfiguredMetaSearch)));
        let llm_cache = Arc::new(LlmClientCache::new("https://example.test", "key"));

        let deps = AgentDeps {
            tools,
            llm_cache,
            config: Arc::new(AppConfig::default()),
            meta_cache: Arc::new(TtlCache::with_default_bands()),
        };
        Graph::new(deps)
    }

    #[tokio::test]
    async fn empty_question_refuses_without_touching_the_llm() {
        let graph = sample_graph().await;
        let result = graph.run(Uuid::new_v4(), String::new()).await;

        assert!(result.answer.to_ascii_lowercase().contains("ask a question"));
        assert!(result.tools_used.contains(&AgentId::Finalizer));
    }

    #[tokio::test]
    async fn recursion_cap_short_circuits_with_a_refusal() {
        let mut graph = sample_graph().await;
        graph.deps.config = Arc::new(AppConfig { recursion_cap: 1, ..AppConfig::default() });

        let result = graph.run(Uuid::new_v4(), "What does rule 601.2a say?".into()).await;

        assert!(result.answer.contains("too complex"));
    }

    #[allow(dead_code)]
    fn silence_unused_fake_llm(client: FakeLlmClient) -> FakeLlmClient {
        client
    }
}
