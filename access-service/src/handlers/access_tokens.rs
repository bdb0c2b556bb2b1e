use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{
        access_token::{
            AccessTokenSummary, IssueAccessTokenRequest, IssueAccessTokenResponse,
            ListAccessTokensResponse, ValidateAccessTokenRequest, ValidateAccessTokenResponse,
        },
        ErrorResponse, SuccessResponse,
    },
    middleware::CurrentUser,
    utils::{JsonBody, PathParam},
    AppState,
};

/// Issue a delegated access token
#[utoipa::path(
    post,
    path = "/access-tokens",
    request_body = IssueAccessTokenRequest,
    responses(
        (status = 201, description = "Token issued; the plaintext token is only returned here", body = IssueAccessTokenResponse),
        (status = 400, description = "Invalid request or unknown modules", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 403, description = "Insufficient privileges", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Access Tokens",
    security(("bearer_auth" = []))
)]
pub async fn create_access_token(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    JsonBody(req): JsonBody<IssueAccessTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let issued = state.tokens.issue(&caller, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(IssueAccessTokenResponse::from(issued)),
    ))
}

/// Validate an access token for a module and consume one use
#[utoipa::path(
    post,
    path = "/access-tokens/validate",
    request_body = ValidateAccessTokenRequest,
    responses(
        (status = 200, description = "Token accepted", body = ValidateAccessTokenResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 403, description = "Invalid or expired access token", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse)
    ),
    tag = "Access Tokens"
)]
pub async fn validate_access_token(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ValidateAccessTokenRequest>,
) -> Result<Json<ValidateAccessTokenResponse>, AppError> {
    let record = state.tokens.validate(&req.token, &req.module).await?;
    Ok(Json(record.into()))
}

/// List tokens issued by the caller
#[utoipa::path(
    get,
    path = "/access-tokens",
    responses(
        (status = 200, description = "Caller's tokens, newest first", body = ListAccessTokensResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 403, description = "Insufficient privileges", body = ErrorResponse)
    ),
    tag = "Access Tokens",
    security(("bearer_auth" = []))
)]
pub async fn list_access_tokens(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ListAccessTokensResponse>, AppError> {
    let tokens = state.tokens.list(&caller).await?;
    Ok(Json(ListAccessTokensResponse {
        tokens: tokens.into_iter().map(AccessTokenSummary::from).collect(),
    }))
}

/// Fetch one token issued by the caller
#[utoipa::path(
    get,
    path = "/access-tokens/{id}",
    params(("id" = Uuid, Path, description = "Access token id")),
    responses(
        (status = 200, description = "Token metadata", body = AccessTokenSummary),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 403, description = "Insufficient privileges", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Access Tokens",
    security(("bearer_auth" = []))
)]
pub async fn get_access_token(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<AccessTokenSummary>, AppError> {
    let record = state.tokens.get(&caller, id).await?;
    Ok(Json(record.into()))
}

/// Revoke a token
#[utoipa::path(
    delete,
    path = "/access-tokens/{id}",
    params(("id" = Uuid, Path, description = "Access token id")),
    responses(
        (status = 200, description = "Token revoked (idempotent)", body = SuccessResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 403, description = "Insufficient privileges", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Access Tokens",
    security(("bearer_auth" = []))
)]
pub async fn revoke_access_token(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.tokens.revoke(&caller, id).await?;
    Ok(Json(SuccessResponse { success: true }))
}
