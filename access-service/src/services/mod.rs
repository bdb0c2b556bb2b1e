//! Business logic for delegation: token lifecycle, tier checks and sessions.

mod access_tokens;
mod clock;
pub mod error;
pub mod metrics;
mod session;
pub mod tier_guard;
mod users;

pub use access_tokens::{AccessTokenService, IssuedAccessToken};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ServiceError;
pub use session::{SessionClaims, SessionVerifier};
pub use users::UserService;
