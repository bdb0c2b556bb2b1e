pub mod access_token;
pub mod module;
pub mod user;

pub use access_token::AccessToken;
pub use module::{catalog, is_known_module, unknown_modules, MODULE_CATALOG};
pub use user::{User, UserStatus, UserTier};
