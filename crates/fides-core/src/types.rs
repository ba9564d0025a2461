use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::CoreError;

/// A credential-source filter attached to a requested attribute.
///
/// A proof attribute satisfying a restricted request must come from a
/// credential issued against one of the listed credential definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// Identifier of the acceptable credential definition.
    pub cred_def_id: String,
}

impl Restriction {
    /// Create a restriction for a single credential definition.
    pub fn new(cred_def_id: impl Into<String>) -> Self {
        Self {
            cred_def_id: cred_def_id.into(),
        }
    }
}

/// One attribute requested by a proof schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedAttribute {
    /// Attribute name as it appears in credentials (e.g. "company_name").
    pub name: String,
    /// Acceptable credential sources. Empty means self-attestation is
    /// permitted for this attribute.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,
}

impl RequestedAttribute {
    /// Request an attribute by name with no source restrictions.
    pub fn unrestricted(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            restrictions: Vec::new(),
        }
    }
}

/// A proof-schema template as loaded from a JSON file.
///
/// Templates are read once and treated as immutable; every issued
/// [`ProofRequest`] is a copy with a per-issuance unique version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofSchemaTemplate {
    /// Schema name.
    pub name: String,
    /// Base schema version. Issued requests append a timestamp suffix.
    pub version: String,
    /// Requested attributes, keyed by attribute key.
    #[serde(default)]
    pub requested_attributes: BTreeMap<String, RequestedAttribute>,
}

impl ProofSchemaTemplate {
    /// Check the template carries the required top-level fields.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::InvalidSchema(
                "template is missing a 'name'".into(),
            ));
        }
        if self.version.trim().is_empty() {
            return Err(CoreError::InvalidSchema(
                "template is missing a 'version'".into(),
            ));
        }
        Ok(())
    }
}

/// A proof request derived from a template.
///
/// The version is unique per issuance so the agent never serves a cached
/// schema for a stale restriction set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRequest {
    /// Schema name, carried over from the template.
    pub name: String,
    /// Unique version: `<template version>:<unix millis>`.
    pub version: String,
    /// Requested attributes with resolved restriction lists.
    pub requested_attributes: BTreeMap<String, RequestedAttribute>,
}

/// A single attested attribute inside an accepted proof response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofAttribute {
    /// Attribute name as supplied by the prover.
    pub name: String,
    /// Attested value.
    pub value: String,
    /// Credential definition the value was proven against. `None` means
    /// the value was self-attested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cred_def_id: Option<String>,
}

/// Proof payload of an accepted verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationInfo {
    /// Attested attributes. Absent when the agent returned no proof data.
    #[serde(default)]
    pub attributes: Option<Vec<ProofAttribute>>,
}

/// An accepted proof response returned by the identity agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// Proof payload.
    #[serde(default)]
    pub info: VerificationInfo,
}

impl Verification {
    /// Build a verification from a list of attested attributes.
    pub fn from_attributes(attributes: Vec<ProofAttribute>) -> Self {
        Self {
            info: VerificationInfo {
                attributes: Some(attributes),
            },
        }
    }
}

/// Personal information extracted from a verified proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Field name → value, flattened from proof attributes.
    pub personal_info: BTreeMap<String, String>,
}

impl UserRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.personal_info.insert(field.into(), value.into());
    }

    /// Look up a field value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.personal_info.get(field).map(String::as_str)
    }

    /// Whether the record has a non-empty value for a field.
    pub fn has(&self, field: &str) -> bool {
        self.get(field).is_some_and(|v| !v.is_empty())
    }
}

impl fmt::Display for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserRecord({} fields)", self.personal_info.len())
    }
}
