//! Auth handlers and supporting modules.
//!
//! Sign-up stores an argon2id hash, sign-in verifies it and sets the `jwt`
//! session cookie, and the session guard checks that cookie on every
//! protected route.
//!
//! ## Session tokens
//!
//! Tokens are `HS256` JWTs carrying the user id in `sub`. The signing secret
//! is injected at start-up and never changes while the process runs, so
//! rotating it signs every user out.

pub(crate) mod password;
pub(crate) mod principal;
pub(crate) mod session;
pub(crate) mod signin;
pub(crate) mod signup;
mod state;
mod token;

pub use principal::Principal;
pub use session::{require_session, SESSION_COOKIE_NAME};
pub use state::{AuthConfig, AuthState};
pub use token::Claims;
