//! HTTP binding to a hosted agency REST API.
//!
//! A thin request/response mapping; no protocol logic lives here. The
//! agency authenticates agents with basic auth (agent name + password).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

use crate::client::AgentClient;
use crate::error::AgentError;
use crate::types::{
    Connection, ConnectionFilter, ConnectionTarget, CredDefQueryResponse, Credential,
    CredentialFilter,
};

/// Error body returned by the agency on failed requests.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// [`AgentClient`] backed by an agency REST API.
pub struct HttpAgent {
    client: reqwest::Client,
    base_url: String,
    agent_name: String,
    agent_password: String,
}

impl HttpAgent {
    /// Create a client for the agency at `base_url`, authenticating as
    /// the named agent.
    pub fn new(
        base_url: impl Into<String>,
        agent_name: impl Into<String>,
        agent_password: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent_name: agent_name.into(),
            agent_password: agent_password.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .basic_auth(&self.agent_name, Some(&self.agent_password))
    }

    /// Deserialize a successful response or map the agency error body.
    async fn handle<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AgentError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AgentError::InvalidResponse(e.to_string()))
        } else {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_default();
            Err(AgentError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn handle_empty(response: reqwest::Response) -> Result<(), AgentError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_default();
            Err(AgentError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl AgentClient for HttpAgent {
    async fn create_connection(
        &self,
        target: ConnectionTarget,
        properties: BTreeMap<String, String>,
    ) -> Result<Connection, AgentError> {
        let body = json!({
            "target": target,
            "properties": properties,
        });
        let response = self
            .request(reqwest::Method::POST, "/connections")
            .json(&body)
            .send()
            .await?;
        Self::handle(response).await
    }

    async fn get_connection(&self, id: &str) -> Result<Connection, AgentError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/connections/{}", id))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AgentError::NotFound(format!("connection {}", id)));
        }
        Self::handle(response).await
    }

    async fn get_connections(
        &self,
        filter: &ConnectionFilter,
    ) -> Result<Vec<Connection>, AgentError> {
        let filter_json = serde_json::to_string(filter)
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        let response = self
            .request(reqwest::Method::GET, "/connections")
            .query(&[("filter", filter_json)])
            .send()
            .await?;
        Self::handle(response).await
    }

    async fn accept_connection(&self, id: &str) -> Result<Connection, AgentError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/connections/{}/accept", id),
            )
            .send()
            .await?;
        Self::handle(response).await
    }

    async fn delete_connection(&self, id: &str) -> Result<(), AgentError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/connections/{}", id))
            .send()
            .await?;
        Self::handle_empty(response).await
    }

    async fn get_credential_definitions(
        &self,
        schema_id: Option<&str>,
        tag_filter: &BTreeMap<String, String>,
    ) -> Result<CredDefQueryResponse, AgentError> {
        let tags_json = serde_json::to_string(tag_filter)
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        let mut query = vec![("tags", tags_json)];
        if let Some(schema_id) = schema_id {
            query.push(("schema_id", schema_id.to_string()));
        }
        let response = self
            .request(reqwest::Method::GET, "/credential_definitions")
            .query(&query)
            .send()
            .await?;
        Self::handle(response).await
    }

    async fn get_credentials(
        &self,
        filter: &CredentialFilter,
    ) -> Result<Vec<Credential>, AgentError> {
        let mut query = Vec::new();
        if let Some(ref state) = filter.state {
            query.push(("state", state.clone()));
        }
        let response = self
            .request(reqwest::Method::GET, "/credentials")
            .query(&query)
            .send()
            .await?;
        Self::handle(response).await
    }

    async fn delete_credential(&self, id: &str) -> Result<(), AgentError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/credentials/{}", id))
            .send()
            .await?;
        Self::handle_empty(response).await
    }
}
