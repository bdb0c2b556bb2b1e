//! Administrative provisioning of user records.

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{error::describe_validation_errors, ServiceError};
use crate::dtos::admin::CreateUserRequest;
use crate::models::{User, UserStatus};
use crate::store::{CredentialStore, DuplicateUser};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn CredentialStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<User, ServiceError> {
        req.validate()
            .map_err(|e| ServiceError::InvalidRequest(describe_validation_errors(&e)))?;

        let id = req.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut user = User::new(id, req.tier, req.organization_id);
        if let Some(status) = req.status {
            user.status = status;
        }

        // Uniqueness is enforced by the store; there is no separate lookup.
        self.store
            .insert_user(&user)
            .await
            .map_err(|e| match e.downcast::<DuplicateUser>() {
                Ok(duplicate) => ServiceError::Conflict(duplicate.to_string()),
                Err(e) => ServiceError::Store(e),
            })?;
        tracing::info!(user_id = %user.id, tier = %user.tier, status = %user.status, "User provisioned");

        Ok(user)
    }

    pub async fn find(&self, user_id: &str) -> Result<User, ServiceError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }

    pub async fn update_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<User, ServiceError> {
        if !self.store.update_user_status(user_id, status).await? {
            return Err(ServiceError::NotFound("User"));
        }
        tracing::info!(user_id = %user_id, status = %status, "User status changed");
        self.find(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserTier;
    use crate::store::InMemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryStore::new()))
    }

    fn create_request(id: Option<&str>, tier: UserTier) -> CreateUserRequest {
        CreateUserRequest {
            id: id.map(str::to_string),
            tier,
            organization_id: Some("org-1".to_string()),
            status: None,
        }
    }

    #[tokio::test]
    async fn generates_id_when_omitted() {
        let users = service();
        let user = users.create(create_request(None, UserTier::Tier3)).await.unwrap();
        assert!(Uuid::parse_str(&user.id).is_ok());
        assert!(user.is_active());
    }

    #[tokio::test]
    async fn duplicate_id_conflicts() {
        let users = service();
        users.create(create_request(Some("owner"), UserTier::Tier2)).await.unwrap();
        assert!(matches!(
            users.create(create_request(Some("owner"), UserTier::Tier1)).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_creates_of_one_id_yield_a_single_conflict() {
        let users = service();
        let (a, b) = tokio::join!(
            users.create(create_request(Some("owner"), UserTier::Tier2)),
            users.create(create_request(Some("owner"), UserTier::Tier1)),
        );

        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|r| matches!(r, Err(ServiceError::Conflict(_))))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn status_updates_are_persisted() {
        let users = service();
        users.create(create_request(Some("owner"), UserTier::Tier2)).await.unwrap();

        let updated = users.update_status("owner", UserStatus::Suspended).await.unwrap();
        assert_eq!(updated.status, UserStatus::Suspended);
        assert_eq!(users.find("owner").await.unwrap().status, UserStatus::Suspended);

        assert!(matches!(
            users.update_status("ghost", UserStatus::Active).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
