use fides_agent::AgentError;
use fides_core::CoreError;

/// Policy-layer errors: schema construction, proof checking, trusted
/// issuer setup, and external registry lookups.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to load proof schema: {0}")]
    SchemaLoad(String),

    #[error("verification carries no proof attributes")]
    InvalidVerification,

    #[error("no proof attribute matches requested attribute '{0}'")]
    AttributeMismatch(String),

    #[error("attribute '{0}' requires a verified credential but was self-attested")]
    UnverifiedAttribute(String),

    #[error("attribute '{0}' does not match the stored value")]
    ValueMismatch(String),

    #[error("missing required signup attribute '{0}'")]
    MissingAttribute(String),

    #[error("trusted-issuer setup failed: {0}")]
    Setup(String),

    #[error("LEI lookup failed: {0}")]
    LeiLookup(String),

    #[error("LEI registry transport error: {0}")]
    LookupTransport(String),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}
