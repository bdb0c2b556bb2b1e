use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use uuid::Uuid;

use super::{CredentialStore, DuplicateUser};
use crate::models::{AccessToken, User, UserStatus};

/// Process-local store backed by `dashmap`.
///
/// `consume_token` holds the write guard of the token's shard across the
/// check and the increment, so concurrent validations of one token serialize.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<DashMap<String, User>>,
    tokens: Arc<DashMap<Uuid, AccessToken>>,
    token_index: Arc<DashMap<String, Uuid>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<(), anyhow::Error> {
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => Err(DuplicateUser(user.id.clone()).into()),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, anyhow::Error> {
        Ok(self.users.get(user_id).map(|u| u.value().clone()))
    }

    async fn update_user_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<bool, anyhow::Error> {
        Ok(match self.users.get_mut(user_id) {
            Some(mut user) => {
                user.status = status;
                true
            }
            None => false,
        })
    }

    async fn insert_token(&self, token: &AccessToken) -> Result<(), anyhow::Error> {
        match self.token_index.entry(token.token_hash.clone()) {
            Entry::Occupied(_) => Err(anyhow::anyhow!("Duplicate access token hash")),
            Entry::Vacant(slot) => {
                self.tokens.insert(token.id, token.clone());
                slot.insert(token.id);
                Ok(())
            }
        }
    }

    async fn find_token_by_id(&self, id: Uuid) -> Result<Option<AccessToken>, anyhow::Error> {
        Ok(self.tokens.get(&id).map(|t| t.value().clone()))
    }

    async fn find_token_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AccessToken>, anyhow::Error> {
        let id = match self.token_index.get(token_hash) {
            Some(id) => *id,
            None => return Ok(None),
        };
        self.find_token_by_id(id).await
    }

    async fn consume_token(
        &self,
        token_hash: &str,
        module: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccessToken>, anyhow::Error> {
        let id = match self.token_index.get(token_hash) {
            Some(id) => *id,
            None => return Ok(None),
        };

        let Some(mut token) = self.tokens.get_mut(&id) else {
            return Ok(None);
        };

        if !token.is_valid_for(module, now) {
            tracing::debug!(
                access_token_id = %token.id,
                reason = token.denial_reason(module, now).unwrap_or("unknown"),
                "Access token denied"
            );
            return Ok(None);
        }

        token.record_use(now);
        Ok(Some(token.clone()))
    }

    async fn list_tokens_by_issuer(
        &self,
        granted_by: &str,
    ) -> Result<Vec<AccessToken>, anyhow::Error> {
        let mut tokens: Vec<AccessToken> = self
            .tokens
            .iter()
            .filter(|t| t.granted_by == granted_by)
            .map(|t| t.value().clone())
            .collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    async fn deactivate_token(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        Ok(match self.tokens.get_mut(&id) {
            Some(mut token) => {
                token.is_active = false;
                true
            }
            None => false,
        })
    }
}
