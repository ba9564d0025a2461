//! Node configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fides_core::TrustedIssuer;

/// Full configuration for a Fides node.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FidesConfig {
    /// Identity-agent connection settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Proof-policy settings.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Connection responder settings.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Trusted credential issuers.
    #[serde(default, rename = "trusted_issuer")]
    pub trusted_issuers: Vec<TrustedIssuer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the hosted agency.
    #[serde(default = "default_agent_url")]
    pub url: String,
    /// Agent name for basic auth.
    #[serde(default)]
    pub name: String,
    /// Agent password for basic auth.
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Path to the login proof-schema template.
    #[serde(default = "default_login_template")]
    pub login_template: PathBuf,
    /// Path to the signup proof-schema template.
    #[serde(default = "default_signup_template")]
    pub signup_template: PathBuf,
    /// Signup profile: "gleif" or "ift_network".
    #[serde(default = "default_signup_profile")]
    pub signup_profile: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Whether the responder runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Wait between polling iterations, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_agent_url() -> String {
    "http://localhost:3030".into()
}
fn default_login_template() -> PathBuf {
    PathBuf::from("./config/login_proof_schema.json")
}
fn default_signup_template() -> PathBuf {
    PathBuf::from("./config/signup_proof_schema.json")
}
fn default_signup_profile() -> String {
    "ift_network".into()
}
fn default_true() -> bool {
    true
}
fn default_poll_interval_ms() -> u64 {
    3000
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url: default_agent_url(),
            name: String::new(),
            password: String::new(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            login_template: default_login_template(),
            signup_template: default_signup_template(),
            signup_profile: default_signup_profile(),
        }
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl FidesConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: FidesConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
