use axum::{extract::Request, middleware::Next, response::Response};
use service_core::error::AppError;

use crate::{models::User, services::tier_guard::ensure_can_delegate};

/// Route-level delegation check. Runs after [`super::session_auth_middleware`]
/// and before any body extraction, so an unauthorized caller never learns
/// whether their payload would have been valid.
pub async fn require_delegation_tier(req: Request, next: Next) -> Result<Response, AppError> {
    let caller = req.extensions().get::<User>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("Session user missing from request extensions"))
    })?;

    ensure_can_delegate(caller)?;

    Ok(next.run(req).await)
}
