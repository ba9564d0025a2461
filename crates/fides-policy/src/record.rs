//! Flattening accepted proofs into user records.

use fides_core::types::{UserRecord, Verification};

use crate::error::PolicyError;

/// Flatten a verification's attested attributes into a user record.
pub fn user_record_from_proof(verification: &Verification) -> Result<UserRecord, PolicyError> {
    let attributes = verification
        .info
        .attributes
        .as_ref()
        .ok_or(PolicyError::InvalidVerification)?;
    let mut record = UserRecord::new();
    for attr in attributes {
        record.insert(attr.name.clone(), attr.value.clone());
    }
    Ok(record)
}
