//! Credential store: persistence for users and access tokens.
//!
//! Services depend on the [`CredentialStore`] trait only; the in-memory and
//! PostgreSQL adapters are interchangeable.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AccessToken, User, UserStatus};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Carried inside the `anyhow::Error` from [`CredentialStore::insert_user`]
/// when the id is already taken.
#[derive(Debug, thiserror::Error)]
#[error("User {0} already exists")]
pub struct DuplicateUser(pub String);

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn health_check(&self) -> Result<(), anyhow::Error>;

    /// Fails with [`DuplicateUser`] when `user.id` exists.
    async fn insert_user(&self, user: &User) -> Result<(), anyhow::Error>;

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, anyhow::Error>;

    /// Returns `false` when no such user exists.
    async fn update_user_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<bool, anyhow::Error>;

    async fn insert_token(&self, token: &AccessToken) -> Result<(), anyhow::Error>;

    async fn find_token_by_id(&self, id: Uuid) -> Result<Option<AccessToken>, anyhow::Error>;

    async fn find_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AccessToken>, anyhow::Error>;

    /// Check the validity predicate for `module` at `now` and, only if it
    /// holds, bump `usage_count` and `last_used_at` in the same atomic step.
    ///
    /// Returns the updated record on success and `None` for any denial.
    async fn consume_token(
        &self,
        token_hash: &str,
        module: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccessToken>, anyhow::Error>;

    /// Tokens issued by `granted_by`, newest first.
    async fn list_tokens_by_issuer(
        &self,
        granted_by: &str,
    ) -> Result<Vec<AccessToken>, anyhow::Error>;

    /// Clear `is_active`. Returns `false` when no such token exists; an
    /// already-inactive token still returns `true`.
    async fn deactivate_token(&self, id: Uuid) -> Result<bool, anyhow::Error>;
}
