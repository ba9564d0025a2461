//! Integration test: proof-based login against a stored user record.

use fides_core::types::{ProofAttribute, Restriction, UserRecord, Verification};
use fides_integration_tests::write_template;
use fides_policy::{LoginHelper, PolicyError, ProofHelper, ProofRequestOptions};

const LOGIN_TEMPLATE: &str = r#"{
    "name": "Verify Account",
    "version": "1.0",
    "requested_attributes": {
        "full_name": { "name": "full name" },
        "lei": {
            "name": "lei",
            "restrictions": [ { "cred_def_id": "lei-issuer:3:CL:12:TAG" } ]
        }
    }
}"#;

fn stored_user() -> UserRecord {
    let mut record = UserRecord::new();
    record.insert("full name", "Jane Doe");
    record.insert("lei", "529900T8BM49AURSDO55");
    record
}

#[tokio::test]
async fn test_login_schema_applies_caller_restrictions() {
    let path = write_template(LOGIN_TEMPLATE);
    let helper = LoginHelper::new(&path);
    let restrictions = vec![Restriction::new("lei-issuer:3:CL:12:TAG")];
    let request = helper
        .get_proof_schema(&ProofRequestOptions {
            restrictions: Some(restrictions.clone()),
        })
        .await
        .expect("schema build");

    for attr in request.requested_attributes.values() {
        assert_eq!(attr.restrictions, restrictions);
    }
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_login_round_trip_accepts_matching_proof() {
    let path = write_template(LOGIN_TEMPLATE);
    let helper = LoginHelper::new(&path);

    // Attribute names come back stripped of case and spaces.
    let verification = Verification::from_attributes(vec![
        ProofAttribute {
            name: "fullname".into(),
            value: "Jane Doe".into(),
            cred_def_id: None,
        },
        ProofAttribute {
            name: "lei".into(),
            value: "529900T8BM49AURSDO55".into(),
            cred_def_id: Some("lei-issuer:3:CL:12:TAG".into()),
        },
    ]);

    let passed = helper
        .check_proof(&verification, &stored_user())
        .await
        .expect("check_proof");
    assert!(passed);
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_login_rejects_self_attested_lei() {
    let path = write_template(LOGIN_TEMPLATE);
    let helper = LoginHelper::new(&path);

    let verification = Verification::from_attributes(vec![
        ProofAttribute {
            name: "fullname".into(),
            value: "Jane Doe".into(),
            cred_def_id: None,
        },
        ProofAttribute {
            name: "lei".into(),
            value: "529900T8BM49AURSDO55".into(),
            cred_def_id: None,
        },
    ]);

    let result = helper.check_proof(&verification, &stored_user()).await;
    assert!(matches!(result, Err(PolicyError::UnverifiedAttribute(_))));
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_login_rejects_wrong_value() {
    let path = write_template(LOGIN_TEMPLATE);
    let helper = LoginHelper::new(&path);

    let verification = Verification::from_attributes(vec![
        ProofAttribute {
            name: "fullname".into(),
            value: "Someone Else".into(),
            cred_def_id: None,
        },
        ProofAttribute {
            name: "lei".into(),
            value: "529900T8BM49AURSDO55".into(),
            cred_def_id: Some("lei-issuer:3:CL:12:TAG".into()),
        },
    ]);

    let result = helper.check_proof(&verification, &stored_user()).await;
    assert!(matches!(result, Err(PolicyError::ValueMismatch(_))));
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_login_schema_version_unique_across_requests() {
    let path = write_template(LOGIN_TEMPLATE);
    let helper = LoginHelper::new(&path);
    let opts = ProofRequestOptions::default();

    let mut versions = std::collections::HashSet::new();
    for _ in 0..10 {
        let request = helper.get_proof_schema(&opts).await.unwrap();
        assert!(
            versions.insert(request.version.clone()),
            "duplicate version {}",
            request.version
        );
    }
    std::fs::remove_file(path).ok();
}
