//! External LEI registry lookup.
//!
//! Maps a GLEIF-style registry record onto canonical user-record
//! fields. The registry serves XML-derived JSON where every leaf is
//! wrapped as `{"$": "value"}`.

use async_trait::async_trait;
use serde::Deserialize;

use fides_core::types::{UserRecord, Verification};

use crate::error::PolicyError;
use crate::record::user_record_from_proof;

/// Public GLEIF lookup endpoint.
const DEFAULT_REGISTRY_URL: &str = "https://leilookup.gleif.org/api/v2/leirecords";

/// An XML-derived JSON leaf: `{"$": "value"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeafValue {
    #[serde(rename = "$", default)]
    pub value: String,
}

/// Legal address of a registered entity.
#[derive(Debug, Clone, Deserialize)]
pub struct LeiAddress {
    #[serde(rename = "FirstAddressLine", default)]
    pub first_address_line: LeafValue,
    #[serde(rename = "AdditionalAddressLine", default)]
    pub additional_address_line: Vec<LeafValue>,
    #[serde(rename = "City", default)]
    pub city: LeafValue,
    #[serde(rename = "Region", default)]
    pub region: Option<LeafValue>,
    #[serde(rename = "PostalCode", default)]
    pub postal_code: LeafValue,
    #[serde(rename = "Country", default)]
    pub country: LeafValue,
}

/// Registered entity details.
#[derive(Debug, Clone, Deserialize)]
pub struct LeiEntity {
    #[serde(rename = "LegalName", default)]
    pub legal_name: LeafValue,
    #[serde(rename = "LegalAddress")]
    pub legal_address: LeiAddress,
}

/// One registry record for an LEI.
#[derive(Debug, Clone, Deserialize)]
pub struct LeiRecord {
    #[serde(rename = "LEI", default)]
    pub lei: LeafValue,
    #[serde(rename = "Entity")]
    pub entity: LeiEntity,
}

/// An LEI registry queryable by LEI number.
#[async_trait]
pub trait LeiRegistry: Send + Sync {
    /// Look up all registry records for an LEI.
    async fn lookup(&self, lei: &str) -> Result<Vec<LeiRecord>, PolicyError>;
}

/// [`LeiRegistry`] backed by the public GLEIF HTTP endpoint.
pub struct HttpLeiRegistry {
    client: reqwest::Client,
    url: String,
}

impl HttpLeiRegistry {
    /// Registry client for the public GLEIF endpoint.
    pub fn new() -> Self {
        Self::with_url(DEFAULT_REGISTRY_URL)
    }

    /// Registry client for a custom endpoint (testing, mirrors).
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Default for HttpLeiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeiRegistry for HttpLeiRegistry {
    async fn lookup(&self, lei: &str) -> Result<Vec<LeiRecord>, PolicyError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("lei", lei)])
            .send()
            .await
            .map_err(|e| PolicyError::LookupTransport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PolicyError::LookupTransport(format!(
                "registry returned status {}",
                response.status()
            )));
        }
        response
            .json::<Vec<LeiRecord>>()
            .await
            .map_err(|e| PolicyError::LookupTransport(e.to_string()))
    }
}

/// Build a user record from a registry lookup for one LEI.
///
/// Exactly one matching record is required; zero or several is a
/// lookup failure, not a silent pick.
pub async fn user_record_from_lei(
    registry: &dyn LeiRegistry,
    lei: &str,
) -> Result<UserRecord, PolicyError> {
    let records = registry.lookup(lei).await?;
    if records.len() != 1 {
        return Err(PolicyError::LeiLookup(format!(
            "expected exactly one record for {}, found {}",
            lei,
            records.len()
        )));
    }
    let record = &records[0];
    let address = &record.entity.legal_address;

    let mut user = UserRecord::new();
    user.insert("lei", record.lei.value.clone());
    user.insert("company_name", record.entity.legal_name.value.clone());
    user.insert("address_line_1", address.first_address_line.value.clone());
    if let Some(line) = address.additional_address_line.first() {
        user.insert("address_line_2", line.value.clone());
    }
    user.insert("city", address.city.value.clone());
    if let Some(ref region) = address.region {
        user.insert("state", region.value.clone());
    }
    user.insert("zip_code", address.postal_code.value.clone());
    user.insert("country", address.country.value.clone());
    tracing::debug!(lei, company = %record.entity.legal_name.value, "LEI record mapped");
    Ok(user)
}

/// Build a user record for the LEI-centric flow: flatten the proof,
/// then enrich it from the registry record for the attested LEI.
pub async fn user_record_from_proof_with_lei(
    verification: &Verification,
    registry: &dyn LeiRegistry,
) -> Result<UserRecord, PolicyError> {
    let mut record = user_record_from_proof(verification)?;
    let lei = record
        .get("lei")
        .map(str::to_string)
        .ok_or_else(|| PolicyError::MissingAttribute("lei".into()))?;
    let registry_record = user_record_from_lei(registry, &lei).await?;
    for (field, value) in registry_record.personal_info {
        record.insert(field, value);
    }
    Ok(record)
}
