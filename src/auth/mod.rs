//! Request authentication and session management.
//!
//! This module holds the security-adjacent core of the crate: the
//! per-request HMAC signer, the session cookie wire codec, the cookie vault
//! for cross-process session persistence, and the restore-or-login session
//! bootstrap.

pub mod cookie;
pub mod session;
pub mod signer;
mod vault;

pub use cookie::{SessionCookie, decode_set_cookie};
pub use session::{Credentials, establish};
pub use vault::{CookieVault, MASTER_KEY_ENV, VaultError};
