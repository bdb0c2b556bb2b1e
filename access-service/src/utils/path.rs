use axum::{
    extract::{rejection::PathRejection, FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;

use crate::services::ServiceError;

/// `Path<T>` whose rejections are 400 `Invalid request` in the JSON error
/// envelope instead of axum's plain text.
pub struct PathParam<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| {
                ServiceError::InvalidRequest(rejection.body_text())
            })?;

        Ok(PathParam(value))
    }
}
