use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AccessToken, UserTier};
use crate::services::IssuedAccessToken;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueAccessTokenRequest {
    /// Grantee user id.
    #[validate(length(min = 1, max = 128, message = "must be between 1 and 128 characters"))]
    #[schema(example = "emp-204")]
    pub user_id: String,
    #[validate(length(min = 1, max = 32, message = "at least one module is required"))]
    #[schema(example = json!(["hr"]))]
    pub modules: Vec<String>,
    /// RFC 3339 timestamp with offset.
    #[schema(example = "2030-01-01T00:00:00Z")]
    pub expires_at: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub max_usage: Option<i64>,
    #[validate(length(max = 500, message = "is limited to 500 characters"))]
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub permissions: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedAccessTokenView {
    pub id: Uuid,
    /// Plaintext credential; only ever returned here.
    pub token: String,
    pub modules: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub max_usage: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueAccessTokenResponse {
    pub success: bool,
    pub access_token: IssuedAccessTokenView,
}

impl From<IssuedAccessToken> for IssueAccessTokenResponse {
    fn from(issued: IssuedAccessToken) -> Self {
        let IssuedAccessToken { token, record } = issued;
        Self {
            success: true,
            access_token: IssuedAccessTokenView {
                id: record.id,
                token,
                modules: record.modules,
                expires_at: record.expires_at,
                max_usage: record.max_usage,
                description: record.description,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAccessTokenRequest {
    pub token: String,
    #[schema(example = "hr")]
    pub module: String,
}

/// Validation echo. Deliberately omits the token string.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedAccessTokenView {
    pub id: Uuid,
    pub modules: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub permissions: Option<serde_json::Value>,
    pub expires_at: DateTime<Utc>,
    pub usage_count: i64,
    pub max_usage: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAccessTokenResponse {
    pub success: bool,
    pub access_token: ValidatedAccessTokenView,
}

impl From<AccessToken> for ValidateAccessTokenResponse {
    fn from(token: AccessToken) -> Self {
        Self {
            success: true,
            access_token: ValidatedAccessTokenView {
                id: token.id,
                modules: token.modules,
                permissions: token.permissions,
                expires_at: token.expires_at,
                usage_count: token.usage_count,
                max_usage: token.max_usage,
            },
        }
    }
}

/// Issuer-facing view of a stored token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenSummary {
    pub id: Uuid,
    pub token_prefix: String,
    pub user_id: String,
    pub granted_by: String,
    pub modules: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub permissions: Option<serde_json::Value>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub usage_count: i64,
    pub max_usage: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<AccessToken> for AccessTokenSummary {
    fn from(token: AccessToken) -> Self {
        Self {
            id: token.id,
            token_prefix: token.token_prefix,
            user_id: token.user_id,
            granted_by: token.granted_by,
            modules: token.modules,
            permissions: token.permissions,
            expires_at: token.expires_at,
            is_active: token.is_active,
            usage_count: token.usage_count,
            max_usage: token.max_usage,
            description: token.description,
            created_at: token.created_at,
            last_used_at: token.last_used_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListAccessTokensResponse {
    pub tokens: Vec<AccessTokenSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModulesResponse {
    pub modules: Vec<String>,
    pub user_tier: UserTier,
}
