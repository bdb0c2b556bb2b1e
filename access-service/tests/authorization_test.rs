//! Session authentication and tier authorization at the HTTP boundary.

mod common;

use access_service::models::{UserStatus, UserTier};
use access_service::store::CredentialStore;
use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn management_routes_require_a_session() {
    let app = TestApp::spawn();

    for (method, uri) in [
        (Method::GET, "/access-tokens"),
        (Method::POST, "/access-tokens"),
        (Method::DELETE, "/access-tokens/2f1f6a52-3c3a-4a8e-9a53-7d2b0f0f4e11"),
        (Method::GET, "/modules"),
    ] {
        let response = app.request(method.clone(), uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn forged_or_unknown_sessions_are_rejected() {
    let app = TestApp::spawn();

    let garbage = app
        .request(Method::GET, "/access-tokens", Some("not-a-jwt"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let ghost = app.session_for("ghost");
    let unknown = app
        .request(Method::GET, "/access-tokens", Some(&ghost), None)
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn employee_tier_cannot_manage_tokens() {
    let app = TestApp::spawn();
    let employee = app.user("employee", UserTier::Tier3).await;

    let issue = app
        .issue(
            &employee,
            json!({
                "userId": "employee",
                "modules": ["hr"],
                "expiresAt": app.expires_in(Duration::hours(1)),
            }),
        )
        .await;
    assert_eq!(issue.status, StatusCode::FORBIDDEN);
    assert_eq!(issue.body, json!({ "error": "Insufficient privileges" }));

    let list = app
        .request(Method::GET, "/access-tokens", Some(&employee), None)
        .await;
    assert_eq!(list.status, StatusCode::FORBIDDEN);

    let revoke = app
        .revoke(&employee, "2f1f6a52-3c3a-4a8e-9a53-7d2b0f0f4e11")
        .await;
    assert_eq!(revoke.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tier_check_precedes_payload_validation() {
    let app = TestApp::spawn();
    let employee = app.user("employee", UserTier::Tier3).await;

    let response = app
        .issue(&employee, json!({ "modules": ["not-a-module"] }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "Insufficient privileges");
}

#[tokio::test]
async fn suspended_owner_loses_delegation_rights() {
    let app = TestApp::spawn();
    let owner = app.user("owner", UserTier::Tier2).await;
    app.store
        .update_user_status("owner", UserStatus::Suspended)
        .await
        .unwrap();

    let response = app
        .request(Method::GET, "/access-tokens", Some(&owner), None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn platform_admin_can_issue() {
    let app = TestApp::spawn();
    let admin = app.user("admin", UserTier::Tier1).await;
    app.user("employee", UserTier::Tier3).await;

    let response = app
        .issue(
            &admin,
            json!({
                "userId": "employee",
                "modules": ["compliance", "legal"],
                "expiresAt": app.expires_in(Duration::days(7)),
                "permissions": { "legal": ["read"] },
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let token = response.body["accessToken"]["token"].as_str().unwrap().to_string();
    let validated = app.validate(&token, "legal").await;
    assert_eq!(validated.status, StatusCode::OK);
    assert_eq!(
        validated.body["accessToken"]["permissions"],
        json!({ "legal": ["read"] })
    );
}

#[tokio::test]
async fn modules_endpoint_reports_catalog_and_tier() {
    let app = TestApp::spawn();
    let employee = app.user("employee", UserTier::Tier3).await;

    let response = app
        .request(Method::GET, "/modules", Some(&employee), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["userTier"], "tier3");
    let modules = response.body["modules"].as_array().unwrap();
    assert!(modules.contains(&json!("hr")));
    assert!(modules.contains(&json!("documents")));
    assert_eq!(modules.len(), 10);
}

#[tokio::test]
async fn validation_needs_no_session() {
    let app = TestApp::spawn();
    let response = app.validate("at_whatever", "hr").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
