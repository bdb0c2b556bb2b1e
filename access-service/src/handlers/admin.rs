use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{
        admin::{CreateUserRequest, UpdateUserStatusRequest, UserResponse},
        ErrorResponse,
    },
    utils::{JsonBody, PathParam},
    AppState,
};

/// Provision a user record
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("admin_api_key" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.create(req).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Suspend, deactivate or reactivate a user
#[utoipa::path(
    patch,
    path = "/admin/users/{id}/status",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("admin_api_key" = []))
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(req): JsonBody<UpdateUserStatusRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.update_status(&id, req.status).await?;
    Ok(Json(user.into()))
}
