/// Errors surfaced by identity-agent clients.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("agent API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
}
