//! Restore-or-login session bootstrap.
//!
//! Given credentials and a vault, [`establish`] produces a ready-to-use
//! client: a restorable cookie skips the network entirely, anything else
//! falls back to a fresh login whose cookie is persisted for the next run.

use std::fmt;

use tracing::{debug, info};

use super::vault::CookieVault;
use crate::client::Client;
use crate::config::ApiConfig;
use crate::error::ClientError;

/// Login credentials. The password never leaves the call scope in plaintext
/// and is redacted in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the plaintext password. Sensitive; never log it.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Builds an authenticated client, preferring the persisted session.
///
/// A cookie restored from the vault is used directly with no network
/// round-trip. A missing or undecodable vault record falls back to a login
/// call; on success the first response cookie is persisted for the next
/// process run.
///
/// # Errors
///
/// Returns [`ClientError::Auth`] when the login is rejected (nothing is
/// persisted in that case), [`ClientError::Vault`] when the vault fails in a
/// non-recoverable way, and transport/decode errors from the login call.
pub async fn establish(
    config: ApiConfig,
    credentials: &Credentials,
    vault: &CookieVault,
) -> Result<Client, ClientError> {
    match vault.load() {
        Ok(cookie) => {
            info!(path = %vault.path().display(), "restored session from cookie vault");
            Ok(Client::with_cookie(config, Some(cookie)))
        }
        Err(error) if error.is_recoverable() => {
            debug!(%error, "no cached session; logging in");
            let client = Client::new(config);
            client
                .login(&credentials.username, credentials.password())
                .await?;
            if let Some(cookie) = client.session_cookie() {
                vault.save(&cookie)?;
                info!(path = %vault.path().display(), "persisted fresh session cookie");
            }
            Ok(client)
        }
        Err(error) => Err(error.into()),
    }
}
