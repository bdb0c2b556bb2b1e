use axum::Json;

use crate::{
    dtos::{access_token::ModulesResponse, ErrorResponse},
    middleware::CurrentUser,
    models::catalog,
};

/// Module catalog together with the caller's tier
#[utoipa::path(
    get,
    path = "/modules",
    responses(
        (status = 200, description = "Module catalog", body = ModulesResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse)
    ),
    tag = "Modules",
    security(("bearer_auth" = []))
)]
pub async fn list_modules(CurrentUser(caller): CurrentUser) -> Json<ModulesResponse> {
    Json(ModulesResponse {
        modules: catalog(),
        user_tier: caller.tier,
    })
}
