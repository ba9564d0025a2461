//! Proof-schema template loading and proof-request issuance.
//!
//! Templates are JSON files read once per loader and cached. Every
//! issued request gets a unique version so the agent never serves a
//! cached schema for a stale restriction set.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::OnceCell;

use fides_core::types::{ProofRequest, ProofSchemaTemplate, Restriction};

use crate::error::PolicyError;

/// Process-wide sequence for proof-request versions. The millisecond
/// timestamp alone can collide under rapid issuance.
static VERSION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Produce a per-issuance unique version for a template.
pub(crate) fn unique_version(base: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = VERSION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}:{}-{}", base, millis, seq)
}

/// Options for issuing a proof request from a template.
#[derive(Debug, Clone, Default)]
pub struct ProofRequestOptions {
    /// When set, this exact restriction list is applied to every
    /// requested attribute.
    pub restrictions: Option<Vec<Restriction>>,
}

/// Loads a proof-schema template once and issues request copies.
///
/// The load is an idempotent lazy-init: racing initializers may read
/// the file twice, which is harmless since the content is static.
pub struct SchemaTemplateLoader {
    path: PathBuf,
    template: OnceCell<ProofSchemaTemplate>,
}

impl SchemaTemplateLoader {
    /// Create a loader for the template file at `path`. The file is not
    /// touched until the first request.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            template: OnceCell::new(),
        }
    }

    /// The cached template, loading it on first use.
    pub async fn template(&self) -> Result<&ProofSchemaTemplate, PolicyError> {
        self.template
            .get_or_try_init(|| async { Self::load(&self.path) })
            .await
    }

    fn load(path: &Path) -> Result<ProofSchemaTemplate, PolicyError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PolicyError::SchemaLoad(format!("{}: {}", path.display(), e)))?;
        let template: ProofSchemaTemplate = serde_json::from_str(&contents)
            .map_err(|e| PolicyError::SchemaLoad(format!("{}: {}", path.display(), e)))?;
        template
            .validate()
            .map_err(|e| PolicyError::SchemaLoad(e.to_string()))?;
        tracing::debug!(path = %path.display(), name = %template.name, "proof schema template loaded");
        Ok(template)
    }

    /// Issue a proof request: a deep copy of the template with a unique
    /// version and, when given, a uniform restriction list.
    pub async fn proof_request(
        &self,
        opts: &ProofRequestOptions,
    ) -> Result<ProofRequest, PolicyError> {
        let template = self.template().await?;
        let mut requested_attributes = template.requested_attributes.clone();
        if let Some(ref restrictions) = opts.restrictions {
            for attr in requested_attributes.values_mut() {
                attr.restrictions = restrictions.clone();
            }
        }
        Ok(ProofRequest {
            name: template.name.clone(),
            version: unique_version(&template.version),
            requested_attributes,
        })
    }
}
