//! Who the current user is and whether their credentials are still good.
//! `claims` reads the bearer token; `session` owns the token pair lifecycle.

pub mod claims;
mod session;

pub use claims::{DecodedToken, IdentityClaims};
pub use session::{SessionManager, SessionState, REFRESH_PATH};
