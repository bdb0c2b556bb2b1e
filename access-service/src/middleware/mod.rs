pub mod admin;
pub mod auth;
pub mod tier_guard;

pub use admin::admin_auth_middleware;
pub use auth::{session_auth_middleware, CurrentUser};
pub use tier_guard::require_delegation_tier;
