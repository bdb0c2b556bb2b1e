use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::{models::User, AppState};

/// Resolve the session bearer token to a stored [`User`] and attach it to the
/// request. Anything short of a verified token naming a known user is a 401.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let claims = state.sessions.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Session token rejected");
        AppError::Unauthorized(anyhow::anyhow!("Invalid or expired session"))
    })?;

    let user = state
        .store
        .find_user(&claims.sub)
        .await
        .map_err(AppError::DatabaseError)?
        .ok_or_else(|| {
            tracing::warn!(user_id = %claims.sub, "Session subject not found");
            AppError::Unauthorized(anyhow::anyhow!("Invalid or expired session"))
        })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// The authenticated caller, as placed by [`session_auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                AppError::InternalError(anyhow::anyhow!(
                    "Session user missing from request extensions"
                ))
            })
    }
}
