//! Account-signup proof policy.
//!
//! Signup proofs combine attributes from several trusted issuers. The
//! helper keeps a tagged connection to each issuer, scopes requested
//! attributes to the issuer named by the attribute-key marker, and
//! checks the accepted proof for the profile's mandatory fields.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use fides_agent::{AgentClient, ConnectionFilter, ConnectionTarget};
use fides_core::issuer::{IssuerRole, TrustedIssuer};
use fides_core::types::{ProofRequest, Restriction, UserRecord, Verification};

use crate::error::PolicyError;
use crate::helper::ProofHelper;
use crate::record::user_record_from_proof;
use crate::schema::{ProofRequestOptions, SchemaTemplateLoader};

/// Default wait for a trusted-issuer connection to confirm.
const DEFAULT_WAIT_BUDGET: Duration = Duration::from_secs(30);

/// Connection property marking a trusted issuer of a given role.
fn trust_tag(role: IssuerRole) -> String {
    format!("trusted_{}", role)
}

/// Mandatory-field profile for a signup flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupProfile {
    /// GLEIF vouches for an entity by its LEI alone.
    Gleif,
    /// The founder network requires company identity, a supplier
    /// history, and either an LEI or a trust-your-supplier record.
    IftNetwork,
}

impl SignupProfile {
    /// Fields every proof for this profile must carry.
    fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Gleif => &["lei"],
            Self::IftNetwork => &[
                "company_name",
                "address_line_1",
                "city",
                "state",
                "zip_code",
                "country",
                "supplier_identifier",
                "supplier_rating",
                "supplier_since",
            ],
        }
    }

    /// Check a flattened proof record for this profile's mandatory
    /// fields, naming the first missing one.
    pub fn check(&self, record: &UserRecord) -> Result<(), PolicyError> {
        for field in self.required_fields() {
            if !record.has(field) {
                return Err(PolicyError::MissingAttribute((*field).to_string()));
            }
        }
        // The founder network admits entities either by LEI or by an
        // established trust-your-supplier record.
        if *self == Self::IftNetwork && !record.has("lei") {
            for field in ["tys_identifier", "trust_value", "member_since"] {
                if !record.has(field) {
                    return Err(PolicyError::MissingAttribute(field.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Proof helper for account signup across trusted issuers.
pub struct AccountSignupHelper {
    agent: Arc<dyn AgentClient>,
    loader: SchemaTemplateLoader,
    issuers: Vec<TrustedIssuer>,
    profile: SignupProfile,
    wait_budget: Duration,
}

impl AccountSignupHelper {
    /// Create a signup helper.
    pub fn new(
        agent: Arc<dyn AgentClient>,
        template_path: impl Into<std::path::PathBuf>,
        issuers: Vec<TrustedIssuer>,
        profile: SignupProfile,
    ) -> Self {
        Self {
            agent,
            loader: SchemaTemplateLoader::new(template_path),
            issuers,
            profile,
            wait_budget: DEFAULT_WAIT_BUDGET,
        }
    }

    /// Override the connection-confirmation wait budget.
    pub fn with_wait_budget(mut self, budget: Duration) -> Self {
        self.wait_budget = budget;
        self
    }

    /// Discover the credential-definition restrictions published by the
    /// trusted issuer of `role`, routed through its tagged connection.
    async fn restrictions_for(&self, role: IssuerRole) -> Result<Vec<Restriction>, PolicyError> {
        let mut tags = BTreeMap::new();
        tags.insert(trust_tag(role), "true".to_string());
        let response = self.agent.get_credential_definitions(None, &tags).await?;
        let restrictions: Vec<Restriction> = response
            .cred_def_ids()
            .into_iter()
            .map(Restriction::new)
            .collect();
        tracing::debug!(%role, count = restrictions.len(), "issuer restrictions resolved");
        Ok(restrictions)
    }
}

#[async_trait]
impl ProofHelper for AccountSignupHelper {
    /// Build the signup proof request.
    ///
    /// Attribute keys carrying an issuer marker get that issuer's
    /// credential-definition restrictions; unmarked keys stay
    /// unrestricted. Per-issuer lookups run concurrently, keyed by role
    /// so each restriction list stays attributed to its issuer.
    async fn get_proof_schema(
        &self,
        _opts: &ProofRequestOptions,
    ) -> Result<ProofRequest, PolicyError> {
        let mut request = self
            .loader
            .proof_request(&ProofRequestOptions::default())
            .await?;

        let roles: HashSet<IssuerRole> = request
            .requested_attributes
            .keys()
            .filter_map(|key| IssuerRole::for_attribute_key(key))
            .collect();

        let lookups = roles.into_iter().map(|role| async move {
            Ok::<_, PolicyError>((role, self.restrictions_for(role).await?))
        });
        let resolved: HashMap<IssuerRole, Vec<Restriction>> =
            try_join_all(lookups).await?.into_iter().collect();

        for (key, attr) in request.requested_attributes.iter_mut() {
            attr.restrictions = match IssuerRole::for_attribute_key(key) {
                Some(role) => resolved.get(&role).cloned().unwrap_or_default(),
                None => Vec::new(),
            };
        }
        Ok(request)
    }

    /// Check the accepted proof for the profile's mandatory fields.
    async fn check_proof(
        &self,
        verification: &Verification,
        _context: &UserRecord,
    ) -> Result<bool, PolicyError> {
        let record = user_record_from_proof(verification)?;
        self.profile.check(&record)?;
        Ok(true)
    }

    /// Establish a tagged connection to every trusted issuer.
    async fn setup(&self) -> Result<(), PolicyError> {
        for issuer in &self.issuers {
            let mut properties = BTreeMap::new();
            properties.insert(trust_tag(issuer.role), "true".to_string());

            let target = if issuer.url.is_empty() {
                ConnectionTarget::Name(issuer.name.clone())
            } else {
                ConnectionTarget::Url(issuer.url.clone())
            };

            let offer = self.agent.create_connection(target, properties).await?;
            self.agent
                .wait_for_connection(&offer.id, self.wait_budget)
                .await
                .map_err(|e| {
                    PolicyError::Setup(format!("issuer {} did not confirm: {}", issuer.name, e))
                })?;
            tracing::info!(issuer = %issuer.name, role = %issuer.role, "trusted issuer connected");
        }
        Ok(())
    }

    /// Delete every connection to a tracked trusted issuer.
    async fn cleanup(&self) -> Result<(), PolicyError> {
        let connections = self.agent.get_connections(&ConnectionFilter::default()).await?;
        for connection in connections {
            let tracked = self.issuers.iter().any(|issuer| {
                connection.remote.matches(&issuer.name) || connection.remote.matches(&issuer.url)
            });
            if tracked {
                self.agent.delete_connection(&connection.id).await?;
                tracing::info!(connection = %connection.id, "trusted issuer connection removed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fides_agent::MemoryAgent;
    use fides_core::types::ProofAttribute;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};

    static FILE_SEQ: AtomicU32 = AtomicU32::new(0);

    const SIGNUP_TEMPLATE: &str = r#"{
        "name": "Account signup",
        "version": "1.2",
        "requested_attributes": {
            "company_name_lei": { "name": "company_name" },
            "lei_status_gleif": { "name": "lei_status" },
            "tys_identifier": { "name": "tys_identifier" },
            "nickname": { "name": "nickname" }
        }
    }"#;

    fn write_template() -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fides-signup-{}-{}.json",
            std::process::id(),
            FILE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SIGNUP_TEMPLATE.as_bytes()).unwrap();
        path
    }

    fn issuers() -> Vec<TrustedIssuer> {
        vec![
            TrustedIssuer::new(IssuerRole::LeiIssuer, "lei-issuer", "https://lei.example"),
            TrustedIssuer::new(IssuerRole::Gleif, "gleif", "https://gleif.example"),
            TrustedIssuer::new(IssuerRole::Tys, "tys", "https://tys.example"),
        ]
    }

    fn helper(agent: Arc<MemoryAgent>, path: &std::path::Path) -> AccountSignupHelper {
        AccountSignupHelper::new(agent, path, issuers(), SignupProfile::IftNetwork)
            .with_wait_budget(Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_setup_connects_all_issuers() {
        let agent = Arc::new(MemoryAgent::new());
        let path = write_template();
        let helper = helper(agent.clone(), &path);
        helper.setup().await.unwrap();
        assert_eq!(agent.connection_count(), 3);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_setup_fails_when_unconfirmed() {
        let agent = Arc::new(MemoryAgent::new());
        agent.set_auto_accept(false);
        let path = write_template();
        let helper = helper(agent, &path);
        let result = helper.setup().await;
        assert!(matches!(result, Err(PolicyError::Setup(_))));
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_cleanup_removes_tracked_connections() {
        let agent = Arc::new(MemoryAgent::new());
        let path = write_template();
        let helper = helper(agent.clone(), &path);
        helper.setup().await.unwrap();
        // An unrelated connection survives cleanup.
        agent.seed_inbound_offer("holder-42");
        helper.cleanup().await.unwrap();
        assert_eq!(agent.connection_count(), 1);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_schema_attaches_issuer_restrictions() {
        let agent = Arc::new(MemoryAgent::new());
        agent.seed_credential_definition("lei-issuer", "lei-def-1");
        agent.seed_credential_definition("gleif", "gleif-def-1");
        agent.seed_credential_definition("tys", "tys-def-1");

        let path = write_template();
        let helper = helper(agent, &path);
        helper.setup().await.unwrap();

        let request = helper
            .get_proof_schema(&ProofRequestOptions::default())
            .await
            .unwrap();

        assert_eq!(
            request.requested_attributes["company_name_lei"].restrictions,
            vec![Restriction::new("lei-def-1")]
        );
        assert_eq!(
            request.requested_attributes["lei_status_gleif"].restrictions,
            vec![Restriction::new("gleif-def-1")]
        );
        assert_eq!(
            request.requested_attributes["tys_identifier"].restrictions,
            vec![Restriction::new("tys-def-1")]
        );
        // No marker, no restrictions: self-attestation permitted.
        assert!(request.requested_attributes["nickname"]
            .restrictions
            .is_empty());
        std::fs::remove_file(path).ok();
    }

    fn ift_attributes(with_lei: bool, with_tys: bool) -> Vec<ProofAttribute> {
        let mut attrs: Vec<ProofAttribute> = [
            ("company_name", "Example Corp"),
            ("address_line_1", "1 Main St"),
            ("city", "Basel"),
            ("state", "BS"),
            ("zip_code", "4001"),
            ("country", "CH"),
            ("supplier_identifier", "S-1"),
            ("supplier_rating", "A"),
            ("supplier_since", "2019"),
        ]
        .iter()
        .map(|(name, value)| ProofAttribute {
            name: (*name).into(),
            value: (*value).into(),
            cred_def_id: Some("def".into()),
        })
        .collect();
        if with_lei {
            attrs.push(ProofAttribute {
                name: "lei".into(),
                value: "529900T8BM49AURSDO55".into(),
                cred_def_id: Some("lei-def-1".into()),
            });
        }
        if with_tys {
            for (name, value) in [
                ("tys_identifier", "T-9"),
                ("trust_value", "87"),
                ("member_since", "2020"),
            ] {
                attrs.push(ProofAttribute {
                    name: name.into(),
                    value: value.into(),
                    cred_def_id: Some("tys-def-1".into()),
                });
            }
        }
        attrs
    }

    #[tokio::test]
    async fn test_check_proof_accepts_lei_branch() {
        let agent = Arc::new(MemoryAgent::new());
        let path = write_template();
        let helper = helper(agent, &path);
        let verification = Verification::from_attributes(ift_attributes(true, false));
        assert!(helper
            .check_proof(&verification, &UserRecord::new())
            .await
            .unwrap());
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_check_proof_accepts_tys_branch() {
        let agent = Arc::new(MemoryAgent::new());
        let path = write_template();
        let helper = helper(agent, &path);
        let verification = Verification::from_attributes(ift_attributes(false, true));
        assert!(helper
            .check_proof(&verification, &UserRecord::new())
            .await
            .unwrap());
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_check_proof_names_first_missing_field() {
        let agent = Arc::new(MemoryAgent::new());
        let path = write_template();
        let helper = helper(agent, &path);
        let mut attrs = ift_attributes(true, false);
        attrs.retain(|a| a.name != "city");
        let verification = Verification::from_attributes(attrs);
        let result = helper.check_proof(&verification, &UserRecord::new()).await;
        match result {
            Err(PolicyError::MissingAttribute(field)) => assert_eq!(field, "city"),
            other => panic!("expected MissingAttribute, got {:?}", other.map(|_| ())),
        }
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_check_proof_requires_lei_or_tys() {
        let agent = Arc::new(MemoryAgent::new());
        let path = write_template();
        let helper = helper(agent, &path);
        let verification = Verification::from_attributes(ift_attributes(false, false));
        let result = helper.check_proof(&verification, &UserRecord::new()).await;
        assert!(matches!(result, Err(PolicyError::MissingAttribute(_))));
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_gleif_profile_requires_lei_only() {
        let profile = SignupProfile::Gleif;
        let mut record = UserRecord::new();
        assert!(matches!(
            profile.check(&record),
            Err(PolicyError::MissingAttribute(field)) if field == "lei"
        ));
        record.insert("lei", "529900T8BM49AURSDO55");
        assert!(profile.check(&record).is_ok());
    }
}
