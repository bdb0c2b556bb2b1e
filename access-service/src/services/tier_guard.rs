//! Delegation authority check: a static allow-list on tier plus account status.

use super::ServiceError;
use crate::models::User;

/// Allow callers whose tier may delegate and whose account is active.
///
/// The error carries no hint of which tier would have been sufficient.
pub fn ensure_can_delegate(caller: &User) -> Result<(), ServiceError> {
    if !caller.tier.can_delegate() {
        tracing::warn!(user_id = %caller.id, tier = %caller.tier, "Delegation refused: tier");
        return Err(ServiceError::Forbidden);
    }

    if !caller.is_active() {
        tracing::warn!(user_id = %caller.id, status = %caller.status, "Delegation refused: status");
        return Err(ServiceError::Forbidden);
    }

    Ok(())
}

/// Issuers manage their own tokens; platform-tier callers manage any.
pub fn ensure_can_manage(caller: &User, granted_by: &str) -> Result<(), ServiceError> {
    ensure_can_delegate(caller)?;
    if caller.id == granted_by || caller.tier.is_platform() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{UserStatus, UserTier};

    #[test]
    fn employee_tier_is_rejected() {
        let user = User::new("emp", UserTier::Tier3, Some("org".to_string()));
        assert!(matches!(ensure_can_delegate(&user), Err(ServiceError::Forbidden)));
    }

    #[test]
    fn owner_and_platform_tiers_pass() {
        assert!(ensure_can_delegate(&User::new("owner", UserTier::Tier2, None)).is_ok());
        assert!(ensure_can_delegate(&User::new("admin", UserTier::Tier1, None)).is_ok());
    }

    #[test]
    fn suspended_owner_is_rejected() {
        let mut user = User::new("owner", UserTier::Tier2, None);
        user.status = UserStatus::Suspended;
        assert!(matches!(ensure_can_delegate(&user), Err(ServiceError::Forbidden)));
    }

    #[test]
    fn only_issuer_or_platform_may_manage() {
        let owner = User::new("owner", UserTier::Tier2, None);
        let other_owner = User::new("other", UserTier::Tier2, None);
        let admin = User::new("admin", UserTier::Tier1, None);

        assert!(ensure_can_manage(&owner, "owner").is_ok());
        assert!(ensure_can_manage(&admin, "owner").is_ok());
        assert!(matches!(
            ensure_can_manage(&other_owner, "owner"),
            Err(ServiceError::Forbidden)
        ));
    }
}
