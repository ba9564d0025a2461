//! Trusted-issuer roles and attribute-key marker dispatch.
//!
//! Signup proof schemas encode the intended credential source in the
//! attribute key (e.g. `company_name_lei` should be proven against the
//! LEI issuer's credential definition). The marker table reproduces the
//! substring cascade the attribute keys were written for: markers are
//! tried in source order against the lowercased key and the first hit
//! wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a trusted credential issuer in the exchange network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuerRole {
    /// Issues LEI credentials to legal entities.
    LeiIssuer,
    /// The global LEI foundation, vouching for LEI issuers.
    Gleif,
    /// Trust-your-supplier network, issuing supplier credentials.
    Tys,
    /// Founder network issuing membership credentials.
    IftNetwork,
}

impl IssuerRole {
    /// Marker substrings, in priority order. First match wins.
    const MARKERS: &'static [(&'static str, IssuerRole)] = &[
        ("_lei", IssuerRole::LeiIssuer),
        ("_gleif", IssuerRole::Gleif),
        ("tys", IssuerRole::Tys),
        ("ift", IssuerRole::IftNetwork),
    ];

    /// Resolve the issuer an attribute key is scoped to, if any.
    ///
    /// Keys without a marker are unrestricted (self-attestation allowed).
    pub fn for_attribute_key(key: &str) -> Option<IssuerRole> {
        let key = key.to_lowercase();
        Self::MARKERS
            .iter()
            .find(|(marker, _)| key.contains(marker))
            .map(|(_, role)| *role)
    }
}

impl fmt::Display for IssuerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeiIssuer => write!(f, "lei_issuer"),
            Self::Gleif => write!(f, "gleif"),
            Self::Tys => write!(f, "tys"),
            Self::IftNetwork => write!(f, "ift_network"),
        }
    }
}

/// A trusted issuer the policy layer maintains a tagged connection to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedIssuer {
    /// Role this issuer plays.
    pub role: IssuerRole,
    /// Agent name of the issuer on the agency.
    pub name: String,
    /// Agent URL of the issuer.
    pub url: String,
}

impl TrustedIssuer {
    /// Create a trusted-issuer entry.
    pub fn new(role: IssuerRole, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            role,
            name: name.into(),
            url: url.into(),
        }
    }
}
