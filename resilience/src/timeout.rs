//! Per-node soft timeout wrapper (spec §4.12, §5).
//!
//! A timed-out node records a timeout issue and returns; it does not abort
//! the request. Callers are expected to treat `Err(AgentError::Timeout)` as
//! "continue with whatever evidence already landed in state", never as a
//! reason to unwind the whole graph.

use std::future::Future;
use std::time::Duration;

use stack_sage_contracts::AgentError;

pub const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REQUEST_BUDGET: Duration = Duration::from_secs(60);

/// Run `fut`, returning `AgentError::Timeout` if it does not finish within
/// `budget`. In-flight work is abandoned on expiry, per spec §5's
/// cancellation model; Tokio drops the future rather than the task
/// continuing to run unsupervised.
pub async fn with_soft_timeout<F, T>(
    context: &str,
    budget: Duration,
    fut: F,
) -> Result<T, AgentError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(budget, fut)
        .await
        .map_err(|_| AgentError::Timeout {
            context: context.to_string(),
            budget_secs: budget.as_secs(),
        })
}
