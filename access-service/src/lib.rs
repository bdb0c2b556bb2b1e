pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AccessConfig, SwaggerMode};
use crate::services::{AccessTokenService, Clock, SessionVerifier, UserService};
use crate::store::CredentialStore;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::access_tokens::create_access_token,
        handlers::access_tokens::validate_access_token,
        handlers::access_tokens::list_access_tokens,
        handlers::access_tokens::get_access_token,
        handlers::access_tokens::revoke_access_token,
        handlers::modules::list_modules,
        handlers::admin::create_user,
        handlers::admin::update_user_status,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::SuccessResponse,
            dtos::access_token::IssueAccessTokenRequest,
            dtos::access_token::IssueAccessTokenResponse,
            dtos::access_token::IssuedAccessTokenView,
            dtos::access_token::ValidateAccessTokenRequest,
            dtos::access_token::ValidateAccessTokenResponse,
            dtos::access_token::ValidatedAccessTokenView,
            dtos::access_token::AccessTokenSummary,
            dtos::access_token::ListAccessTokensResponse,
            dtos::access_token::ModulesResponse,
            dtos::admin::CreateUserRequest,
            dtos::admin::UpdateUserStatusRequest,
            dtos::admin::UserResponse,
            models::UserTier,
            models::UserStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Access Tokens", description = "Issue, validate, list and revoke delegated access tokens"),
        (name = "Modules", description = "Platform module catalog"),
        (name = "Admin", description = "User provisioning"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    middleware::admin::ADMIN_API_KEY_HEADER,
                ))),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AccessConfig,
    pub store: Arc<dyn CredentialStore>,
    pub tokens: AccessTokenService,
    pub users: UserService,
    pub sessions: SessionVerifier,
    pub validate_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

impl AppState {
    pub fn new(config: AccessConfig, store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>) -> Self {
        let tokens = AccessTokenService::new(
            store.clone(),
            clock,
            chrono::Duration::days(config.tokens.max_lifetime_days),
        );
        let users = UserService::new(store.clone());
        let sessions = SessionVerifier::new(&config.session);
        let validate_rate_limiter = create_ip_rate_limiter(
            config.rate_limit.validate_limit,
            config.rate_limit.validate_window_seconds,
        );
        let ip_rate_limiter = create_ip_rate_limiter(
            config.rate_limit.global_ip_limit,
            config.rate_limit.global_ip_window_seconds,
        );

        Self {
            config,
            store,
            tokens,
            users,
            sessions,
            validate_rate_limiter,
            ip_rate_limiter,
        }
    }
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    // Issuer-facing routes: session first, then the tier check, then the handler.
    let management_routes = Router::new()
        .route(
            "/access-tokens",
            post(handlers::access_tokens::create_access_token)
                .get(handlers::access_tokens::list_access_tokens),
        )
        .route(
            "/access-tokens/:id",
            get(handlers::access_tokens::get_access_token)
                .delete(handlers::access_tokens::revoke_access_token),
        )
        .layer(from_fn(middleware::require_delegation_tier))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::session_auth_middleware,
        ));

    let session_routes = Router::new()
        .route("/modules", get(handlers::modules::list_modules))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::session_auth_middleware,
        ));

    // Token holders are unauthenticated, so the validate route gets its own limiter.
    let validate_route = Router::new()
        .route(
            "/access-tokens/validate",
            post(handlers::access_tokens::validate_access_token),
        )
        .layer(from_fn_with_state(
            state.validate_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let admin_routes = Router::new()
        .route("/admin/users", post(handlers::admin::create_user))
        .route(
            "/admin/users/:id/status",
            patch(handlers::admin::update_user_status),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::admin_auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics));

    match state.config.swagger.enabled {
        SwaggerMode::Public => {
            app = app.merge(
                SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()),
            );
        }
        SwaggerMode::Authenticated => {
            app = app.merge(
                Router::new()
                    .merge(
                        SwaggerUi::new("/docs")
                            .url("/.well-known/openapi.json", ApiDoc::openapi()),
                    )
                    .layer(from_fn_with_state(
                        state.clone(),
                        middleware::admin_auth_middleware,
                    )),
            );
        }
        SwaggerMode::Disabled => {}
    }

    let ip_limiter = state.ip_rate_limiter.clone();
    let cors = cors_layer(&state.config.security.allowed_origins);

    let app = app
        .merge(management_routes)
        .merge(session_routes)
        .merge(validate_route)
        .merge(admin_routes)
        .with_state(state)
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors);

    Ok(app)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = if allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(tower_http::cors::Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    layer
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(middleware::admin::ADMIN_API_KEY_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Credential store unreachable")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Credential store health check failed");
        AppError::DatabaseError(e)
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "store": "up"
        }
    })))
}
