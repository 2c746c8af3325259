/// Taxonomy of error kinds tools and agents can raise.
///
/// Only [`AgentError::InternalInvariantBreach`] aborts the graph; every other
/// kind is caught at the tool/agent boundary, translated into an `issues` entry
/// on `AgentState`, and the graph continues (spec §7).
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("rules index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("timed out after {budget_secs}s: {context}")]
    Timeout { context: String, budget_secs: u64 },

    #[error("draft could not be grounded in cited evidence: {0}")]
    Ungrounded(String),

    #[error("tool misconfigured: {0}")]
    ToolMisconfigured(String),

    #[error("internal invariant breach: {0}")]
    InternalInvariantBreach(String),
}

impl AgentError {
    /// The stable kind label, used in diagnostics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::NotFound(_) => "not_found",
            AgentError::InvalidQuery(_) => "invalid_query",
            AgentError::UpstreamUnavailable(_) => "upstream_unavailable",
            AgentError::IndexUnavailable(_) => "index_unavailable",
            AgentError::Timeout { .. } => "timeout",
            AgentError::Ungrounded(_) => "ungrounded",
            AgentError::ToolMisconfigured(_) => "tool_misconfigured",
            AgentError::InternalInvariantBreach(_) => "internal_invariant_breach",
        }
    }

    /// True if this error must abort the whole graph rather than becoming an
    /// `issues` entry (spec §7 propagation policy).
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentError::InternalInvariantBreach(_))
    }

    /// Render this error the way it should appear in `issues`/user-visible text:
    /// plain language naming the failure kind, never a confident-sounding claim.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::NotFound(what) => format!("I couldn't find {what}."),
            AgentError::InvalidQuery(why) => format!("That query isn't valid: {why}."),
            AgentError::UpstreamUnavailable(what) => {
                format!("{what} is temporarily unavailable.")
            }
            AgentError::IndexUnavailable(why) => format!("Rules lookup is unavailable: {why}."),
            AgentError::Timeout { context, budget_secs } => {
                format!("{context} took longer than the {budget_secs}s budget allowed.")
            }
            AgentError::Ungrounded(why) => format!("I couldn't confirm that answer: {why}."),
            AgentError::ToolMisconfigured(what) => format!("{what} is not configured."),
            AgentError::InternalInvariantBreach(why) => {
                format!("Something went wrong internally: {why}.")
            }
        }
    }
}

