//! Integration test: account signup across trusted issuers.
//!
//! Drives the full flow against an in-memory agent: connect to trusted
//! issuers, build a restriction-scoped proof request, judge the
//! accepted proof, and extract a user record.

use std::sync::Arc;
use std::time::Duration;

use fides_agent::MemoryAgent;
use fides_core::types::{ProofAttribute, UserRecord, Verification};
use fides_core::{IssuerRole, TrustedIssuer};
use fides_integration_tests::write_template;
use fides_policy::{
    user_record_from_proof, AccountSignupHelper, ProofHelper, ProofRequestOptions, SignupProfile,
};

const SIGNUP_TEMPLATE: &str = r#"{
    "name": "Account signup",
    "version": "2.0",
    "requested_attributes": {
        "company_name_lei": { "name": "company_name" },
        "address_line_1_lei": { "name": "address_line_1" },
        "lei_status_gleif": { "name": "lei_status" },
        "tys_identifier": { "name": "tys_identifier" },
        "nickname": { "name": "nickname" }
    }
}"#;

fn trusted_issuers() -> Vec<TrustedIssuer> {
    vec![
        TrustedIssuer::new(IssuerRole::LeiIssuer, "lei-issuer", "https://lei.example"),
        TrustedIssuer::new(IssuerRole::Gleif, "gleif", "https://gleif.example"),
        TrustedIssuer::new(IssuerRole::Tys, "tys", "https://tys.example"),
    ]
}

fn seeded_agent() -> Arc<MemoryAgent> {
    let agent = Arc::new(MemoryAgent::new());
    agent.seed_credential_definition("lei-issuer", "lei-issuer:3:CL:12:TAG");
    agent.seed_credential_definition("gleif", "gleif:3:CL:44:TAG");
    agent.seed_credential_definition("tys", "tys:3:CL:77:TAG");
    agent
}

#[tokio::test]
async fn test_signup_schema_scopes_attributes_to_issuers() {
    let agent = seeded_agent();
    let path = write_template(SIGNUP_TEMPLATE);
    let helper = AccountSignupHelper::new(
        agent.clone(),
        &path,
        trusted_issuers(),
        SignupProfile::IftNetwork,
    )
    .with_wait_budget(Duration::from_millis(100));

    helper.setup().await.expect("issuer setup");
    let request = helper
        .get_proof_schema(&ProofRequestOptions::default())
        .await
        .expect("schema build");

    // Both LEI-marked keys share the LEI issuer's restriction.
    for key in ["company_name_lei", "address_line_1_lei"] {
        let restrictions = &request.requested_attributes[key].restrictions;
        assert_eq!(restrictions.len(), 1);
        assert_eq!(restrictions[0].cred_def_id, "lei-issuer:3:CL:12:TAG");
    }
    assert_eq!(
        request.requested_attributes["lei_status_gleif"].restrictions[0].cred_def_id,
        "gleif:3:CL:44:TAG"
    );
    assert_eq!(
        request.requested_attributes["tys_identifier"].restrictions[0].cred_def_id,
        "tys:3:CL:77:TAG"
    );
    assert!(request.requested_attributes["nickname"]
        .restrictions
        .is_empty());

    helper.cleanup().await.expect("cleanup");
    assert_eq!(agent.connection_count(), 0);
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_signup_schema_versions_stay_unique() {
    let agent = seeded_agent();
    let path = write_template(SIGNUP_TEMPLATE);
    let helper = AccountSignupHelper::new(
        agent,
        &path,
        trusted_issuers(),
        SignupProfile::IftNetwork,
    )
    .with_wait_budget(Duration::from_millis(100));
    helper.setup().await.expect("issuer setup");

    let first = helper
        .get_proof_schema(&ProofRequestOptions::default())
        .await
        .unwrap();
    let second = helper
        .get_proof_schema(&ProofRequestOptions::default())
        .await
        .unwrap();
    assert_ne!(first.version, second.version);
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_signup_proof_to_user_record() {
    let agent = seeded_agent();
    let path = write_template(SIGNUP_TEMPLATE);
    let helper = AccountSignupHelper::new(
        agent,
        &path,
        trusted_issuers(),
        SignupProfile::Gleif,
    );

    let verification = Verification::from_attributes(vec![
        ProofAttribute {
            name: "lei".into(),
            value: "529900T8BM49AURSDO55".into(),
            cred_def_id: Some("lei-issuer:3:CL:12:TAG".into()),
        },
        ProofAttribute {
            name: "company_name".into(),
            value: "Example Corp".into(),
            cred_def_id: Some("lei-issuer:3:CL:12:TAG".into()),
        },
    ]);

    let passed = helper
        .check_proof(&verification, &UserRecord::new())
        .await
        .expect("check_proof");
    assert!(passed);

    let record = user_record_from_proof(&verification).expect("flatten");
    assert_eq!(record.get("lei"), Some("529900T8BM49AURSDO55"));
    assert_eq!(record.get("company_name"), Some("Example Corp"));
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn test_signup_fails_without_confirmed_issuers() {
    let agent = Arc::new(MemoryAgent::new());
    agent.set_auto_accept(false);
    let path = write_template(SIGNUP_TEMPLATE);
    let helper = AccountSignupHelper::new(
        agent,
        &path,
        trusted_issuers(),
        SignupProfile::IftNetwork,
    )
    .with_wait_budget(Duration::from_millis(20));

    assert!(helper.setup().await.is_err());
    std::fs::remove_file(path).ok();
}
