use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle state of a connection on the agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Offer received from a remote agent, awaiting our response.
    InboundOffer,
    /// Offer we sent, awaiting the remote agent's response.
    OutboundOffer,
    /// Connection established in both directions.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InboundOffer => write!(f, "inbound_offer"),
            Self::OutboundOffer => write!(f, "outbound_offer"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// How to address the remote agent when creating a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionTarget {
    /// Agent name registered on the shared agency.
    Name(String),
    /// Direct agent URL.
    Url(String),
}

/// Identifying information for the remote end of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPeer {
    /// Remote agent name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remote agent URL, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ConnectionPeer {
    /// Whether this peer matches the given agent name or URL.
    pub fn matches(&self, name_or_url: &str) -> bool {
        self.name.as_deref() == Some(name_or_url) || self.url.as_deref() == Some(name_or_url)
    }
}

/// A connection record as reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Connection (or offer) identifier.
    pub id: String,
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// Remote agent identity.
    #[serde(default)]
    pub remote: ConnectionPeer,
    /// Free-form properties attached at creation (trust tags, etc.).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Filter for listing connections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionFilter {
    /// Match connections in this state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ConnectionState>,
    /// Match connections carrying all of these properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl ConnectionFilter {
    /// Filter by connection state.
    pub fn by_state(state: ConnectionState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    /// Require a property key/value pair.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Whether a connection satisfies this filter.
    pub fn matches(&self, connection: &Connection) -> bool {
        if let Some(state) = self.state {
            if connection.state != state {
                return false;
            }
        }
        self.properties
            .iter()
            .all(|(k, v)| connection.properties.get(k) == Some(v))
    }
}

/// A credential definition published by an issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDefinition {
    /// Credential definition identifier.
    pub id: String,
    /// Schema the definition is bound to, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
}

/// Credential-definition items returned by one queried agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredDefItems {
    /// The definitions themselves.
    #[serde(default)]
    pub items: Vec<CredentialDefinition>,
}

/// Query results from a single remote agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCredDefs {
    /// Result set for this agent.
    #[serde(default)]
    pub results: CredDefItems,
}

/// Response to a routed credential-definition query.
///
/// Shape mirrors the agency wire format: one entry per agent the query
/// was routed to, each carrying its own item list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredDefQueryResponse {
    /// Per-agent results.
    #[serde(default)]
    pub agents: Vec<AgentCredDefs>,
}

impl CredDefQueryResponse {
    /// Flatten all returned credential-definition ids.
    pub fn cred_def_ids(&self) -> Vec<String> {
        self.agents
            .iter()
            .flat_map(|a| a.results.items.iter().map(|d| d.id.clone()))
            .collect()
    }
}

/// A credential held in the agent's wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Credential identifier.
    pub id: String,
    /// Exchange state (e.g. "stored", "inbound_offer").
    pub state: String,
}

/// Filter for listing credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFilter {
    /// Match credentials in this exchange state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}
