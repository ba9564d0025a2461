//! In-memory agent used by tests and the demo binary's dry-run mode.
//!
//! Connections confirm immediately unless auto-accept is disabled, and
//! accept failures can be scripted to exercise error paths.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::client::AgentClient;
use crate::error::AgentError;
use crate::types::{
    AgentCredDefs, Connection, ConnectionFilter, ConnectionPeer, ConnectionState,
    ConnectionTarget, CredDefItems, CredDefQueryResponse, Credential, CredentialDefinition,
    CredentialFilter,
};

/// In-memory [`AgentClient`] implementation.
pub struct MemoryAgent {
    connections: DashMap<String, Connection>,
    credentials: DashMap<String, Credential>,
    /// Credential definitions published per remote agent name.
    cred_defs: DashMap<String, Vec<CredentialDefinition>>,
    /// When set, outbound offers confirm immediately.
    auto_accept: AtomicBool,
    /// When set, `accept_connection` fails.
    fail_accept: AtomicBool,
    /// Number of successful accepts, for test assertions.
    accept_count: AtomicUsize,
}

impl MemoryAgent {
    /// Create an empty agent with auto-accepting connections.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            credentials: DashMap::new(),
            cred_defs: DashMap::new(),
            auto_accept: AtomicBool::new(true),
            fail_accept: AtomicBool::new(false),
            accept_count: AtomicUsize::new(0),
        }
    }

    /// Control whether outbound offers confirm immediately.
    pub fn set_auto_accept(&self, enabled: bool) {
        self.auto_accept.store(enabled, Ordering::SeqCst);
    }

    /// Make subsequent `accept_connection` calls fail.
    pub fn set_fail_accept(&self, enabled: bool) {
        self.fail_accept.store(enabled, Ordering::SeqCst);
    }

    /// Number of offers accepted so far.
    pub fn accept_count(&self) -> usize {
        self.accept_count.load(Ordering::SeqCst)
    }

    /// Seed an inbound connection offer from a named remote agent.
    pub fn seed_inbound_offer(&self, remote_name: &str) -> Connection {
        let connection = Connection {
            id: Uuid::now_v7().to_string(),
            state: ConnectionState::InboundOffer,
            remote: ConnectionPeer {
                name: Some(remote_name.to_string()),
                url: None,
            },
            properties: BTreeMap::new(),
        };
        self.connections
            .insert(connection.id.clone(), connection.clone());
        connection
    }

    /// Publish a credential definition on behalf of a remote agent.
    pub fn seed_credential_definition(&self, agent_name: &str, cred_def_id: &str) {
        self.cred_defs
            .entry(agent_name.to_string())
            .or_default()
            .push(CredentialDefinition {
                id: cred_def_id.to_string(),
                schema_id: None,
            });
    }

    /// Seed a wallet credential.
    pub fn seed_credential(&self, id: &str, state: &str) {
        self.credentials.insert(
            id.to_string(),
            Credential {
                id: id.to_string(),
                state: state.to_string(),
            },
        );
    }

    /// Number of live connection records.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for MemoryAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentClient for MemoryAgent {
    async fn create_connection(
        &self,
        target: ConnectionTarget,
        properties: BTreeMap<String, String>,
    ) -> Result<Connection, AgentError> {
        let remote = match target {
            ConnectionTarget::Name(name) => ConnectionPeer {
                name: Some(name),
                url: None,
            },
            ConnectionTarget::Url(url) => ConnectionPeer {
                name: None,
                url: Some(url),
            },
        };
        let state = if self.auto_accept.load(Ordering::SeqCst) {
            ConnectionState::Connected
        } else {
            ConnectionState::OutboundOffer
        };
        let connection = Connection {
            id: Uuid::now_v7().to_string(),
            state,
            remote,
            properties,
        };
        self.connections
            .insert(connection.id.clone(), connection.clone());
        Ok(connection)
    }

    async fn get_connection(&self, id: &str) -> Result<Connection, AgentError> {
        self.connections
            .get(id)
            .map(|c| c.clone())
            .ok_or_else(|| AgentError::NotFound(format!("connection {}", id)))
    }

    async fn get_connections(
        &self,
        filter: &ConnectionFilter,
    ) -> Result<Vec<Connection>, AgentError> {
        let mut matched: Vec<Connection> = self
            .connections
            .iter()
            .filter(|c| filter.matches(c.value()))
            .map(|c| c.clone())
            .collect();
        // Deterministic order for callers that take "the first" offer.
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matched)
    }

    async fn accept_connection(&self, id: &str) -> Result<Connection, AgentError> {
        if self.fail_accept.load(Ordering::SeqCst) {
            return Err(AgentError::Api {
                status: 500,
                message: format!("accept failed for connection {}", id),
            });
        }
        let mut entry = self
            .connections
            .get_mut(id)
            .ok_or_else(|| AgentError::NotFound(format!("connection {}", id)))?;
        entry.state = ConnectionState::Connected;
        self.accept_count.fetch_add(1, Ordering::SeqCst);
        Ok(entry.clone())
    }

    async fn delete_connection(&self, id: &str) -> Result<(), AgentError> {
        self.connections
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AgentError::NotFound(format!("connection {}", id)))
    }

    async fn get_credential_definitions(
        &self,
        schema_id: Option<&str>,
        tag_filter: &BTreeMap<String, String>,
    ) -> Result<CredDefQueryResponse, AgentError> {
        let filter = ConnectionFilter {
            state: Some(ConnectionState::Connected),
            properties: tag_filter.clone(),
        };
        let mut agents = Vec::new();
        for connection in self.get_connections(&filter).await? {
            let Some(name) = connection.remote.name else {
                continue;
            };
            let items = self
                .cred_defs
                .get(&name)
                .map(|defs| {
                    defs.iter()
                        .filter(|d| {
                            schema_id.is_none() || d.schema_id.as_deref() == schema_id
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            agents.push(AgentCredDefs {
                results: CredDefItems { items },
            });
        }
        Ok(CredDefQueryResponse { agents })
    }

    async fn get_credentials(
        &self,
        filter: &CredentialFilter,
    ) -> Result<Vec<Credential>, AgentError> {
        Ok(self
            .credentials
            .iter()
            .filter(|c| {
                filter
                    .state
                    .as_deref()
                    .map_or(true, |state| c.state == state)
            })
            .map(|c| c.clone())
            .collect())
    }

    async fn delete_credential(&self, id: &str) -> Result<(), AgentError> {
        self.credentials
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| AgentError::NotFound(format!("credential {}", id)))
    }
}
