use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::AgentError;
use crate::types::{
    Connection, ConnectionFilter, ConnectionState, ConnectionTarget, CredDefQueryResponse,
    Credential, CredentialFilter,
};

/// Interval between polls while waiting for a connection to confirm.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Capability surface of a hosted identity agent.
///
/// Everything the policy layer needs from the agent: connection
/// management, routed credential-definition queries, and wallet access.
/// Protocol details (DIDs, ledger writes, credential exchange) stay on
/// the agent's side of this boundary.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Offer a connection to a remote agent, attaching free-form
    /// properties (trust tags) to the offer.
    async fn create_connection(
        &self,
        target: ConnectionTarget,
        properties: BTreeMap<String, String>,
    ) -> Result<Connection, AgentError>;

    /// Fetch a single connection by id.
    async fn get_connection(&self, id: &str) -> Result<Connection, AgentError>;

    /// List connections matching a filter.
    async fn get_connections(
        &self,
        filter: &ConnectionFilter,
    ) -> Result<Vec<Connection>, AgentError>;

    /// Accept an inbound connection offer.
    async fn accept_connection(&self, id: &str) -> Result<Connection, AgentError>;

    /// Delete a connection or offer.
    async fn delete_connection(&self, id: &str) -> Result<(), AgentError>;

    /// Query credential definitions, routed through connections whose
    /// properties match `tag_filter`. An empty filter queries the
    /// agent's own definitions.
    async fn get_credential_definitions(
        &self,
        schema_id: Option<&str>,
        tag_filter: &BTreeMap<String, String>,
    ) -> Result<CredDefQueryResponse, AgentError>;

    /// List wallet credentials matching a filter.
    async fn get_credentials(
        &self,
        filter: &CredentialFilter,
    ) -> Result<Vec<Credential>, AgentError>;

    /// Delete a wallet credential.
    async fn delete_credential(&self, id: &str) -> Result<(), AgentError>;

    /// Poll a connection until it reaches `connected`, or time out.
    async fn wait_for_connection(
        &self,
        id: &str,
        timeout: Duration,
    ) -> Result<Connection, AgentError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let connection = self.get_connection(id).await?;
            if connection.state == ConnectionState::Connected {
                return Ok(connection);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AgentError::Timeout(format!("connection {}", id)));
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}
