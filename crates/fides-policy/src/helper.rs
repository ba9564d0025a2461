use async_trait::async_trait;

use fides_core::types::{ProofRequest, UserRecord, Verification};

use crate::error::PolicyError;
use crate::schema::{ProofRequestOptions, SchemaTemplateLoader};

/// Strategy interface for proof-based flows.
///
/// A helper knows how to build the proof request for its flow and how
/// to judge the accepted proof that comes back. Concrete helpers are
/// selected by configuration and passed around as trait objects.
#[async_trait]
pub trait ProofHelper: Send + Sync {
    /// Build the proof request for this flow.
    async fn get_proof_schema(
        &self,
        opts: &ProofRequestOptions,
    ) -> Result<ProofRequest, PolicyError>;

    /// Decide whether an accepted proof satisfies this flow's policy.
    async fn check_proof(
        &self,
        verification: &Verification,
        context: &UserRecord,
    ) -> Result<bool, PolicyError>;

    /// Establish any connections the helper needs. Default: nothing.
    async fn setup(&self) -> Result<(), PolicyError> {
        Ok(())
    }

    /// Tear down whatever `setup` established. Default: nothing.
    async fn cleanup(&self) -> Result<(), PolicyError> {
        Ok(())
    }
}

/// Helper that delegates all judgement to the agent.
///
/// Issues the template schema without restrictions and treats any proof
/// the agent accepted as passing. Used by flows where the cryptographic
/// verification is the whole policy.
pub struct NullProofHelper {
    loader: SchemaTemplateLoader,
}

impl NullProofHelper {
    /// Create a helper over the template file at `template_path`.
    pub fn new(template_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            loader: SchemaTemplateLoader::new(template_path),
        }
    }
}

#[async_trait]
impl ProofHelper for NullProofHelper {
    async fn get_proof_schema(
        &self,
        _opts: &ProofRequestOptions,
    ) -> Result<ProofRequest, PolicyError> {
        // Restrictions are deliberately not applied.
        self.loader
            .proof_request(&ProofRequestOptions::default())
            .await
    }

    async fn check_proof(
        &self,
        _verification: &Verification,
        _context: &UserRecord,
    ) -> Result<bool, PolicyError> {
        Ok(true)
    }
}
