//! Health, metrics, docs and the cross-cutting layers.

mod common;

use access_service::config::SwaggerMode;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{test_config, TestApp, TEST_ADMIN_API_KEY};

#[tokio::test]
async fn health_check_returns_200() {
    let app = TestApp::spawn();
    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["service"], "access-service-test");
    assert_eq!(response.body["checks"]["store"], "up");
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.headers.get("x-request-id").unwrap(), "req-123");
    assert_eq!(response.headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(response.headers.get("cache-control").unwrap(), "no-store");

    let generated = app.request(Method::GET, "/health", None, None).await;
    assert!(generated.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn metrics_endpoint_is_plain_text() {
    let app = TestApp::spawn();
    let response = app.request(Method::GET, "/metrics", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_string());
}

#[tokio::test]
async fn openapi_document_lists_token_routes() {
    let app = TestApp::spawn();
    let response = app
        .request(Method::GET, "/.well-known/openapi.json", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/access-tokens"].is_object());
    assert!(response.body["paths"]["/access-tokens/validate"].is_object());
    assert!(response.body["paths"]["/modules"].is_object());
}

#[tokio::test]
async fn authenticated_docs_require_admin_key() {
    let mut config = test_config();
    config.swagger.enabled = SwaggerMode::Authenticated;
    let app = TestApp::with_config(config);

    let anonymous = app
        .request(Method::GET, "/.well-known/openapi.json", None, None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/.well-known/openapi.json")
        .header("x-admin-api-key", TEST_ADMIN_API_KEY)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::OK);
}

#[tokio::test]
async fn disabled_docs_are_not_served() {
    let mut config = test_config();
    config.swagger.enabled = SwaggerMode::Disabled;
    let app = TestApp::with_config(config);

    let response = app
        .request(Method::GET, "/.well-known/openapi.json", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validate_route_is_rate_limited_per_ip() {
    let mut config = test_config();
    config.rate_limit.validate_limit = 2;
    config.rate_limit.validate_window_seconds = 60;
    let app = TestApp::with_config(config);

    let attempt = |ip: &'static str| {
        Request::builder()
            .method(Method::POST)
            .uri("/access-tokens/validate")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(r#"{"token":"at_x","module":"hr"}"#))
            .unwrap()
    };

    assert_eq!(app.send(attempt("203.0.113.7")).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.send(attempt("203.0.113.7")).await.status, StatusCode::FORBIDDEN);

    let limited = app.send(attempt("203.0.113.7")).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers.contains_key("retry-after"));

    assert_eq!(app.send(attempt("198.51.100.4")).await.status, StatusCode::FORBIDDEN);
}
