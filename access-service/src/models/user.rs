//! User model - the grantor/grantee side of delegation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Privilege level, ordered by delegation authority.
///
/// `Tier1` is platform-wide, `Tier2` owns an organization and `Tier3` is an
/// individual member with no authority to delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserTier {
    Tier1,
    Tier2,
    Tier3,
}

impl UserTier {
    /// Tiers allowed to issue, list and revoke access tokens.
    pub const DELEGATING: [UserTier; 2] = [UserTier::Tier1, UserTier::Tier2];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserTier::Tier1 => "tier1",
            UserTier::Tier2 => "tier2",
            UserTier::Tier3 => "tier3",
        }
    }

    pub fn can_delegate(&self) -> bool {
        Self::DELEGATING.contains(self)
    }

    pub fn is_platform(&self) -> bool {
        *self == UserTier::Tier1
    }
}

impl fmt::Display for UserTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tier1" => Ok(UserTier::Tier1),
            "tier2" => Ok(UserTier::Tier2),
            "tier3" => Ok(UserTier::Tier3),
            _ => Err(format!("Invalid user tier: {}", s)),
        }
    }
}

/// User state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Invalid user status: {}", s)),
        }
    }
}

/// User record. The tier is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub tier: UserTier,
    pub organization_id: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>, tier: UserTier, organization_id: Option<String>) -> Self {
        Self {
            id: id.into(),
            tier,
            organization_id,
            status: UserStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}
