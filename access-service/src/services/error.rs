use service_core::error::AppError;
use thiserror::Error;

use crate::models::catalog;

/// Single message for every validation-time denial so callers cannot tell
/// a missing token from a revoked, expired or exhausted one.
pub const DENIED_MESSAGE: &str = "Invalid or expired access token";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Insufficient privileges")]
    Forbidden,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown modules: {invalid:?}")]
    UnknownModule { invalid: Vec<String> },

    #[error("Access denied")]
    Denied,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Forbidden => {
                AppError::Forbidden(anyhow::anyhow!("Insufficient privileges"))
            }
            ServiceError::InvalidRequest(detail) => AppError::BadRequestWithDetails(
                "Invalid request".to_string(),
                serde_json::Value::String(detail),
            ),
            ServiceError::UnknownModule { invalid } => AppError::BadRequestWithDetails(
                "Invalid modules".to_string(),
                serde_json::json!({
                    "invalidModules": invalid,
                    "validModules": catalog(),
                }),
            ),
            ServiceError::Denied => AppError::Forbidden(anyhow::anyhow!(DENIED_MESSAGE)),
            ServiceError::NotFound(what) => AppError::NotFound(anyhow::anyhow!("{} not found", what)),
            ServiceError::Conflict(msg) => AppError::Conflict(anyhow::anyhow!(msg)),
            ServiceError::Store(e) => AppError::DatabaseError(e),
        }
    }
}

/// Flatten `validator` errors into `field: message` pairs, keyed by the
/// camelCase names the JSON bodies use.
pub fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            let field = wire_name(field);
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
