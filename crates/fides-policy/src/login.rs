//! Login-flow proof checking against an existing user record.

use async_trait::async_trait;

use fides_core::types::{ProofRequest, UserRecord, Verification};

use crate::error::PolicyError;
use crate::helper::ProofHelper;
use crate::schema::{ProofRequestOptions, SchemaTemplateLoader};

/// Normalize an attribute name for comparison.
///
/// Credential-exchange systems strip whitespace and case from attribute
/// names in transit, so "full name" and "fullname" refer to the same
/// attribute.
pub fn normalize_attribute_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Proof helper for password-less login.
///
/// Requests the static login schema and checks the returned proof
/// attribute-by-attribute against the stored user record.
pub struct LoginHelper {
    loader: SchemaTemplateLoader,
}

impl LoginHelper {
    /// Create a helper over the login template at `template_path`.
    pub fn new(template_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            loader: SchemaTemplateLoader::new(template_path),
        }
    }
}

#[async_trait]
impl ProofHelper for LoginHelper {
    async fn get_proof_schema(
        &self,
        opts: &ProofRequestOptions,
    ) -> Result<ProofRequest, PolicyError> {
        self.loader.proof_request(opts).await
    }

    async fn check_proof(
        &self,
        verification: &Verification,
        context: &UserRecord,
    ) -> Result<bool, PolicyError> {
        let attributes = verification
            .info
            .attributes
            .as_ref()
            .ok_or(PolicyError::InvalidVerification)?;
        let template = self.loader.template().await?;

        for requested in template.requested_attributes.values() {
            let wanted = normalize_attribute_name(&requested.name);
            let matched = attributes
                .iter()
                .find(|a| normalize_attribute_name(&a.name) == wanted)
                .ok_or_else(|| PolicyError::AttributeMismatch(requested.name.clone()))?;

            // Restricted attributes must come from a verified credential,
            // never from self-attestation.
            if !requested.restrictions.is_empty() && matched.cred_def_id.is_none() {
                return Err(PolicyError::UnverifiedAttribute(requested.name.clone()));
            }

            match context.get(&requested.name) {
                Some(expected) if expected == matched.value => {}
                _ => return Err(PolicyError::ValueMismatch(requested.name.clone())),
            }
            tracing::debug!(attribute = %requested.name, "login attribute verified");
        }
        Ok(true)
    }
}
