use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{User, UserStatus, UserTier};

/// Provision a user record. The id is generated when omitted.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 128))]
    pub id: Option<String>,
    pub tier: UserTier,
    #[validate(length(min = 1, max = 128))]
    pub organization_id: Option<String>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub tier: UserTier,
    pub organization_id: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            tier: user.tier,
            organization_id: user.organization_id,
            status: user.status,
            created_at: user.created_at,
        }
    }
}
