//! Access token model - a delegated, module-scoped bearer credential.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted access token record.
///
/// The plaintext token is never stored; `token_hash` is its SHA-256 digest and
/// `token_prefix` a short non-secret hint for listings.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AccessToken {
    pub id: Uuid,
    pub token_hash: String,
    pub token_prefix: String,
    /// Grantee.
    pub user_id: String,
    /// Issuer.
    pub granted_by: String,
    pub modules: Vec<String>,
    pub permissions: Option<serde_json::Value>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub usage_count: i64,
    pub max_usage: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Number of leading characters of the plaintext kept as `token_prefix`.
    pub const PREFIX_LEN: usize = 10;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        token: &str,
        user_id: String,
        granted_by: String,
        modules: Vec<String>,
        permissions: Option<serde_json::Value>,
        expires_at: DateTime<Utc>,
        max_usage: Option<i64>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash: Self::calculate_lookup_hash(token),
            token_prefix: token.chars().take(Self::PREFIX_LEN).collect(),
            user_id,
            granted_by,
            modules,
            permissions,
            expires_at,
            is_active: true,
            usage_count: 0,
            max_usage,
            description,
            created_at: now,
            last_used_at: None,
        }
    }

    pub fn calculate_lookup_hash(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.max_usage, Some(max) if self.usage_count >= max)
    }

    pub fn grants_module(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m == module)
    }

    /// The validity predicate: active, unexpired, scoped to `module` and under quota.
    pub fn is_valid_for(&self, module: &str, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now) && self.grants_module(module) && !self.is_exhausted()
    }

    /// Short reason a validation failed; only ever logged, never returned.
    pub fn denial_reason(&self, module: &str, now: DateTime<Utc>) -> Option<&'static str> {
        if !self.is_active {
            Some("revoked")
        } else if self.is_expired(now) {
            Some("expired")
        } else if !self.grants_module(module) {
            Some("module_not_granted")
        } else if self.is_exhausted() {
            Some("usage_exhausted")
        } else {
            None
        }
    }

    pub fn record_use(&mut self, now: DateTime<Utc>) {
        self.usage_count += 1;
        self.last_used_at = Some(now);
    }
}
