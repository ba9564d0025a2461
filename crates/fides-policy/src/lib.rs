//! Fides Policy — Proof-request construction and proof-verification
//! policy: schema templates, login and signup helpers, and the external
//! LEI registry lookup.

pub mod error;
pub mod helper;
pub mod lei;
pub mod login;
pub mod record;
pub mod schema;
pub mod signup;

pub use error::PolicyError;
pub use helper::{NullProofHelper, ProofHelper};
pub use lei::{
    HttpLeiRegistry, LeiRecord, LeiRegistry, user_record_from_lei, user_record_from_proof_with_lei,
};
pub use login::LoginHelper;
pub use record::user_record_from_proof;
pub use schema::{ProofRequestOptions, SchemaTemplateLoader};
pub use signup::{AccountSignupHelper, SignupProfile};
