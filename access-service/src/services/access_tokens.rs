//! Issuance, validation, revocation and listing of delegated access tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{
    error::describe_validation_errors, metrics, tier_guard, Clock, ServiceError,
};
use crate::dtos::access_token::IssueAccessTokenRequest;
use crate::models::{unknown_modules, AccessToken, User};
use crate::store::CredentialStore;

const TOKEN_PREFIX: &str = "at_";
const TOKEN_ENTROPY_BYTES: usize = 32;

/// Result of issuance: the stored record plus the plaintext credential,
/// which exists nowhere else once this value is dropped.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub record: AccessToken,
}

#[derive(Clone)]
pub struct AccessTokenService {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    max_lifetime: Duration,
}

impl AccessTokenService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        max_lifetime: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            max_lifetime,
        }
    }

    /// Issue a token on behalf of `issuer`.
    ///
    /// Checks run in order: delegation authority, request shape, module
    /// catalog, grantee. Nothing is written unless all of them pass.
    pub async fn issue(
        &self,
        issuer: &User,
        req: IssueAccessTokenRequest,
    ) -> Result<IssuedAccessToken, ServiceError> {
        tier_guard::ensure_can_delegate(issuer)?;

        req.validate()
            .map_err(|e| ServiceError::InvalidRequest(describe_validation_errors(&e)))?;

        let now = self.clock.now();
        let expires_at = self.parse_expiry(&req.expires_at, now)?;

        if let Some(permissions) = &req.permissions {
            if !permissions.is_object() {
                return Err(ServiceError::InvalidRequest(
                    "permissions: must be a JSON object".to_string(),
                ));
            }
        }

        let invalid = unknown_modules(req.modules.iter().map(String::as_str));
        if !invalid.is_empty() {
            tracing::info!(
                issuer_id = %issuer.id,
                invalid_modules = ?invalid,
                "Access token request names unknown modules"
            );
            return Err(ServiceError::UnknownModule { invalid });
        }

        let grantee = self
            .store
            .find_user(&req.user_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidRequest("userId: does not reference a known user".to_string())
            })?;
        if !grantee.is_active() {
            return Err(ServiceError::InvalidRequest(
                "userId: grantee account is not active".to_string(),
            ));
        }

        let mut modules: Vec<String> = Vec::with_capacity(req.modules.len());
        for module in req.modules {
            if !modules.contains(&module) {
                modules.push(module);
            }
        }

        let token = generate_token();
        let record = AccessToken::new(
            &token,
            grantee.id,
            issuer.id.clone(),
            modules,
            req.permissions,
            expires_at,
            req.max_usage,
            req.description,
            now,
        );

        self.store.insert_token(&record).await?;
        metrics::record_issued(record.modules.len());

        tracing::info!(
            access_token_id = %record.id,
            granted_by = %record.granted_by,
            user_id = %record.user_id,
            modules = ?record.modules,
            expires_at = %record.expires_at,
            max_usage = ?record.max_usage,
            "Access token issued"
        );

        Ok(IssuedAccessToken { token, record })
    }

    /// Check `token` against `module` and consume one use on success.
    ///
    /// Every failure collapses to [`ServiceError::Denied`].
    pub async fn validate(&self, token: &str, module: &str) -> Result<AccessToken, ServiceError> {
        let outcome = self.try_validate(token, module).await;
        metrics::record_validation(matches!(outcome, Ok(Some(_))));

        match outcome? {
            Some(record) => {
                tracing::info!(
                    access_token_id = %record.id,
                    module = %module,
                    usage_count = record.usage_count,
                    "Access token accepted"
                );
                Ok(record)
            }
            None => {
                tracing::info!(module = %module, "Access token denied");
                Err(ServiceError::Denied)
            }
        }
    }

    async fn try_validate(
        &self,
        token: &str,
        module: &str,
    ) -> Result<Option<AccessToken>, ServiceError> {
        if token.is_empty() || module.is_empty() {
            return Ok(None);
        }

        let token_hash = AccessToken::calculate_lookup_hash(token);
        let Some(record) = self.store.find_token_by_hash(&token_hash).await? else {
            tracing::debug!("Access token denied: unknown");
            return Ok(None);
        };

        let grantee_active = self
            .store
            .find_user(&record.user_id)
            .await?
            .is_some_and(|u| u.is_active());
        if !grantee_active {
            tracing::debug!(access_token_id = %record.id, "Access token denied: grantee inactive");
            return Ok(None);
        }

        let now = self.clock.now();
        if let Some(reason) = record.denial_reason(module, now) {
            tracing::debug!(access_token_id = %record.id, reason, "Access token denied");
            return Ok(None);
        }

        // The check above is advisory; the store re-checks atomically.
        Ok(self.store.consume_token(&token_hash, module, now).await?)
    }

    /// Deactivate a token. Revoking an inactive token succeeds without change.
    pub async fn revoke(&self, caller: &User, id: Uuid) -> Result<(), ServiceError> {
        tier_guard::ensure_can_delegate(caller)?;

        let record = self
            .store
            .find_token_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Access token"))?;

        tier_guard::ensure_can_manage(caller, &record.granted_by)?;

        if !record.is_active {
            tracing::info!(access_token_id = %id, revoked_by = %caller.id, "Access token already revoked");
            return Ok(());
        }

        if !self.store.deactivate_token(id).await? {
            return Err(ServiceError::NotFound("Access token"));
        }
        metrics::record_revoked();

        tracing::info!(
            access_token_id = %id,
            revoked_by = %caller.id,
            granted_by = %record.granted_by,
            "Access token revoked"
        );

        Ok(())
    }

    /// Tokens `caller` has issued, newest first.
    pub async fn list(&self, caller: &User) -> Result<Vec<AccessToken>, ServiceError> {
        tier_guard::ensure_can_delegate(caller)?;
        Ok(self.store.list_tokens_by_issuer(&caller.id).await?)
    }

    /// A single token, visible to its issuer or a platform-tier caller.
    pub async fn get(&self, caller: &User, id: Uuid) -> Result<AccessToken, ServiceError> {
        tier_guard::ensure_can_delegate(caller)?;

        let record = self
            .store
            .find_token_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Access token"))?;

        // Hide other issuers' tokens behind the same 404.
        tier_guard::ensure_can_manage(caller, &record.granted_by)
            .map_err(|_| ServiceError::NotFound("Access token"))?;

        Ok(record)
    }

    fn parse_expiry(&self, raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ServiceError> {
        let expires_at = DateTime::parse_from_rfc3339(raw)
            .map_err(|_| {
                ServiceError::InvalidRequest(
                    "expiresAt: must be an ISO-8601 timestamp with offset".to_string(),
                )
            })?
            .with_timezone(&Utc);

        if expires_at <= now {
            return Err(ServiceError::InvalidRequest(
                "expiresAt: must be in the future".to_string(),
            ));
        }

        let latest = now.checked_add_signed(self.max_lifetime).ok_or_else(|| {
            ServiceError::InvalidRequest("expiresAt: lifetime limit is out of range".to_string())
        })?;
        if expires_at > latest {
            return Err(ServiceError::InvalidRequest(format!(
                "expiresAt: must be within {} days",
                self.max_lifetime.num_days()
            )));
        }

        Ok(expires_at)
    }
}

/// `at_` followed by 256 bits from the OS CSPRNG, base64url without padding.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("{}{}", TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(bytes))
}
