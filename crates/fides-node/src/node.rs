//! The Fides demo node orchestrator.
//!
//! Wires an agent client, the signup proof helper, and the connection
//! responder from configuration, and manages their lifecycle.

use anyhow::Result;
use std::sync::Arc;

use fides_agent::{AgentClient, HttpAgent, MemoryAgent};
use fides_policy::{AccountSignupHelper, ProofHelper, SignupProfile};
use fides_responder::ConnectionResponder;

use crate::config::FidesConfig;

/// Parse the configured signup profile name.
fn parse_profile(name: &str) -> Result<SignupProfile> {
    match name {
        "gleif" => Ok(SignupProfile::Gleif),
        "ift_network" => Ok(SignupProfile::IftNetwork),
        other => anyhow::bail!("unknown signup profile: {}", other),
    }
}

/// The demo node, orchestrating agent, policy, and responder.
pub struct FidesNode {
    config: FidesConfig,
    agent: Arc<dyn AgentClient>,
    signup_helper: AccountSignupHelper,
    responder: ConnectionResponder,
}

impl FidesNode {
    /// Create a node from config. With `dry_run` the node talks to an
    /// in-memory agent instead of the configured agency.
    pub fn new(config: FidesConfig, dry_run: bool) -> Result<Self> {
        let agent: Arc<dyn AgentClient> = if dry_run {
            tracing::info!("dry run: using in-memory agent");
            Arc::new(MemoryAgent::new())
        } else {
            Arc::new(HttpAgent::new(
                &config.agent.url,
                &config.agent.name,
                &config.agent.password,
            ))
        };

        let profile = parse_profile(&config.policy.signup_profile)?;
        let signup_helper = AccountSignupHelper::new(
            agent.clone(),
            &config.policy.signup_template,
            config.trusted_issuers.clone(),
            profile,
        );

        let responder = ConnectionResponder::new(agent.clone());
        responder.set_interval_ms(config.responder.poll_interval_ms as i64)?;

        Ok(Self {
            config,
            agent,
            signup_helper,
            responder,
        })
    }

    /// Connect to trusted issuers and start the responder.
    pub async fn start(&self) -> Result<()> {
        if self.config.trusted_issuers.is_empty() {
            tracing::warn!("no trusted issuers configured; signup proofs will be unrestricted");
        } else {
            self.signup_helper.setup().await?;
        }
        if self.config.responder.enabled {
            self.responder.start()?;
            tracing::info!(
                interval_ms = self.config.responder.poll_interval_ms,
                "connection responder running"
            );
        }
        Ok(())
    }

    /// Stop the responder and tear down trusted-issuer connections.
    pub async fn shutdown(&self) -> Result<()> {
        self.responder.stop().await;
        self.signup_helper.cleanup().await?;
        tracing::info!("Fides node shut down");
        Ok(())
    }

    /// The underlying agent client.
    pub fn agent(&self) -> &Arc<dyn AgentClient> {
        &self.agent
    }

    /// The signup proof helper.
    pub fn signup_helper(&self) -> &AccountSignupHelper {
        &self.signup_helper
    }
}
