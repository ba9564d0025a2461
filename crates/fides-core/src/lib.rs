//! Fides Core — Fundamental types and errors for the Fides
//! credential-exchange policy engine.

pub mod error;
pub mod issuer;
pub mod types;

pub use error::CoreError;
pub use issuer::{IssuerRole, TrustedIssuer};
pub use types::{
    ProofAttribute, ProofRequest, ProofSchemaTemplate, RequestedAttribute, Restriction,
    UserRecord, Verification, VerificationInfo,
};
