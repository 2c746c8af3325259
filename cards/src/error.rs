use stack_sage_contracts::AgentError;

/// Raw transport-level errors from the card service, before the adapter maps
/// them onto the shared [`AgentError`] taxonomy (spec §4.1, §7).
#[derive(Debug, Clone, thiserror::Error)]
pub enum CardSourceError {
    #[error("card not found: {0}")]
    NotFound(String),
    #[error("card service unavailable: {0}")]
    Upstream(String),
}

impl From<CardSourceError> for AgentError {
    fn from(error: CardSourceError) -> Self {
        match error {
            CardSourceError::NotFound(name) => AgentError::NotFound(format!("card \"{name}\"")),
            CardSourceError::Upstream(why) => AgentError::UpstreamUnavailable(why),
        }
    }
}
