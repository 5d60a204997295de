//! API endpoint and credential configuration.
//!
//! The original mobile app bakes its host, signing key and password salt in
//! as process-wide constants. Here they live in an explicit [`ApiConfig`]
//! record passed into the client constructor, so tests can point the client
//! at a mock server without touching global state.

use std::time::Duration;

use url::Url;

use crate::error::ClientError;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (60 seconds; responses are small JSON bodies).
pub const READ_TIMEOUT_SECS: u64 = 60;

const DEFAULT_BASE_URL: &str = "https://qkgermany.feomedia.se";
const DEFAULT_USER_AGENT: &str = "Quizduell A 1.3.2";
const DEFAULT_AUTH_KEY: &str = "irETGpoJjG57rrSC";
const DEFAULT_PASSWORD_SALT: &str = "SQ2zgOTmQc8KXmBP";

/// Immutable configuration for a Quizduell API client.
///
/// The defaults target the production German-language server and reproduce
/// the wire contract of the official app. Only the signing key, salt and
/// user agent matter for server acceptance; `base_url` may be swapped for a
/// local mock in tests.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Scheme and host, no trailing slash (e.g. `https://qkgermany.feomedia.se`).
    pub base_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Pre-shared HMAC key for the `authorization` header.
    pub auth_key: String,
    /// Salt prepended to plaintext passwords before MD5 hashing.
    pub password_salt: String,
    /// HTTP connect timeout.
    pub connect_timeout: Duration,
    /// HTTP read timeout.
    pub read_timeout: Duration,
    /// Skip TLS certificate verification.
    ///
    /// The original client disabled verification unconditionally; here it is
    /// opt-in and off by default.
    pub danger_accept_invalid_certs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth_key: DEFAULT_AUTH_KEY.to_string(),
            password_salt: DEFAULT_PASSWORD_SALT.to_string(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            danger_accept_invalid_certs: false,
        }
    }
}

impl ApiConfig {
    /// Returns a config pointing at `base_url` with production defaults for
    /// everything else. Intended for tests against a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] when `base_url` is not an
    /// absolute URL with a host.
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let raw = base_url.as_ref();
        let parsed = Url::parse(raw)
            .map_err(|error| ClientError::invalid_base_url(raw, error.to_string()))?;
        if !parsed.has_host() {
            return Err(ClientError::invalid_base_url(raw, "missing host"));
        }
        // Signed messages concatenate base URL and path directly, so the
        // stored form must not end in a slash.
        let mut base_url = parsed.to_string();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }
}
