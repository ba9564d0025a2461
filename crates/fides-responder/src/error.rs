use fides_agent::AgentError;

/// Errors surfaced by the connection responder.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("invalid poll interval: {0} ms")]
    InvalidInterval(i64),

    #[error("responder is already running")]
    AlreadyRunning,

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),
}
