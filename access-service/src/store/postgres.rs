use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, FromRow};
use uuid::Uuid;

use super::{CredentialStore, DuplicateUser};
use crate::models::{AccessToken, User, UserStatus};

/// PostgreSQL adapter.
///
/// `consume_token` is a single conditional `UPDATE ... RETURNING`, so the row
/// lock taken by the update is what serializes concurrent validations.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    tier: String,
    organization_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            tier: row.tier.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            status: row.status.parse().map_err(|e: String| anyhow::anyhow!(e))?,
            id: row.id,
            organization_id: row.organization_id,
            created_at: row.created_at,
        })
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn health_check(&self) -> Result<(), anyhow::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, tier, organization_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.id)
        .bind(user.tier.as_str())
        .bind(&user.organization_id)
        .bind(user.status.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DuplicateUser(user.id.clone()).into()
            }
            other => anyhow::Error::from(other),
        })?;
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, anyhow::Error> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn update_user_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("UPDATE users SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_token(&self, token: &AccessToken) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            INSERT INTO access_tokens (
                id, token_hash, token_prefix, user_id, granted_by, modules, permissions,
                expires_at, is_active, usage_count, max_usage, description, created_at, last_used_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(token.id)
        .bind(&token.token_hash)
        .bind(&token.token_prefix)
        .bind(&token.user_id)
        .bind(&token.granted_by)
        .bind(&token.modules)
        .bind(&token.permissions)
        .bind(token.expires_at)
        .bind(token.is_active)
        .bind(token.usage_count)
        .bind(token.max_usage)
        .bind(&token.description)
        .bind(token.created_at)
        .bind(token.last_used_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_token_by_id(&self, id: Uuid) -> Result<Option<AccessToken>, anyhow::Error> {
        Ok(
            sqlx::query_as::<_, AccessToken>("SELECT * FROM access_tokens WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AccessToken>, anyhow::Error> {
        Ok(
            sqlx::query_as::<_, AccessToken>("SELECT * FROM access_tokens WHERE token_hash = $1")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn consume_token(
        &self,
        token_hash: &str,
        module: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccessToken>, anyhow::Error> {
        let token = sqlx::query_as::<_, AccessToken>(
            r#"
            UPDATE access_tokens
            SET usage_count = usage_count + 1, last_used_at = $3
            WHERE token_hash = $1
              AND is_active
              AND expires_at >= $3
              AND $2 = ANY(modules)
              AND (max_usage IS NULL OR usage_count < max_usage)
            RETURNING *
            "#,
        )
        .bind(token_hash)
        .bind(module)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if token.is_none() {
            tracing::debug!(module = %module, "Access token denied");
        }

        Ok(token)
    }

    async fn list_tokens_by_issuer(
        &self,
        granted_by: &str,
    ) -> Result<Vec<AccessToken>, anyhow::Error> {
        Ok(sqlx::query_as::<_, AccessToken>(
            "SELECT * FROM access_tokens WHERE granted_by = $1 ORDER BY created_at DESC",
        )
        .bind(granted_by)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn deactivate_token(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("UPDATE access_tokens SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
