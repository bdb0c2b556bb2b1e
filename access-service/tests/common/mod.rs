//! Shared setup for access-service integration tests.
//!
//! Builds the full router over an in-memory store and a manual clock, and
//! drives it in-process with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use access_service::{
    build_router,
    config::{
        AccessConfig, Environment, RateLimitConfig, SecurityConfig, SessionConfig,
        SwaggerConfig, SwaggerMode, TokenPolicyConfig,
    },
    models::{User, UserTier},
    services::{Clock, ManualClock},
    store::{CredentialStore, InMemoryStore},
    AppState,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_ADMIN_API_KEY: &str = "test-admin-key-12345";
pub const TEST_SESSION_SECRET: &str = "test-session-secret-0123456789abcdef";

pub fn test_config() -> AccessConfig {
    AccessConfig {
        common: service_core::config::Config::default(),
        environment: Environment::Dev,
        service_name: "access-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: None,
        session: SessionConfig {
            jwt_secret: TEST_SESSION_SECRET.to_string(),
            issuer: "business-platform".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            admin_api_key: TEST_ADMIN_API_KEY.to_string(),
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Public,
        },
        rate_limit: RateLimitConfig {
            validate_limit: 1000,
            validate_window_seconds: 60,
            global_ip_limit: 1000,
            global_ip_window_seconds: 60,
        },
        tokens: TokenPolicyConfig {
            max_lifetime_days: 90,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: InMemoryStore,
    pub clock: Arc<ManualClock>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AccessConfig) -> Self {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::default());
        let state = AppState::new(config, Arc::new(store.clone()), clock.clone());
        let router = build_router(state.clone()).expect("Failed to build router");

        Self {
            router,
            state,
            store,
            clock,
        }
    }

    /// Store a user and return a session token for them.
    pub async fn user(&self, id: &str, tier: UserTier) -> String {
        let user = User::new(id, tier, Some("org-1".to_string()));
        self.store.insert_user(&user).await.expect("Failed to insert user");
        self.session_for(id)
    }

    pub fn session_for(&self, id: &str) -> String {
        self.state
            .sessions
            .issue(id, Duration::minutes(15))
            .expect("Failed to mint session token")
    }

    pub fn expires_in(&self, by: Duration) -> String {
        (self.clock.now() + by).to_rfc3339()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        session: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = session {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn issue(&self, session: &str, body: Value) -> TestResponse {
        self.request(Method::POST, "/access-tokens", Some(session), Some(body))
            .await
    }

    pub async fn validate(&self, token: &str, module: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/access-tokens/validate",
            None,
            Some(serde_json::json!({ "token": token, "module": module })),
        )
        .await
    }

    pub async fn revoke(&self, session: &str, id: &str) -> TestResponse {
        self.request(
            Method::DELETE,
            &format!("/access-tokens/{}", id),
            Some(session),
            None,
        )
        .await
    }
}
