// Public API - what other modules can use
pub use clock::{Clock, ManualClock, SystemClock};
pub use handlers::{issue_token, logout, TOKEN_COOKIE};
pub use middleware::require_session;
pub use token::{TokenError, TokenService, SESSION_LIFETIME_HOURS};
pub use types::{IdentityClaims, SessionClaims, SuccessResponse};

// Internal modules
mod clock;
mod handlers;
mod middleware;
mod token;
mod types;
