//! Fides Agent — Capability surface of the hosted identity agent:
//! the [`AgentClient`] trait, its wire types, an HTTP binding, and an
//! in-memory agent for tests and demos.

pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod types;

pub use client::AgentClient;
pub use error::AgentError;
pub use http::HttpAgent;
pub use memory::MemoryAgent;
pub use types::{
    AgentCredDefs, Connection, ConnectionFilter, ConnectionPeer, ConnectionState,
    ConnectionTarget, CredDefItems, CredDefQueryResponse, Credential, CredentialDefinition,
    CredentialFilter,
};
