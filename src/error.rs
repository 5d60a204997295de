//! Error types for API calls.
//!
//! The taxonomy keeps "service unreachable", "server said no" and "we could
//! not make sense of the reply" as distinct variants so callers can react to
//! each differently. No call is retried; a failed game action is simply
//! reported upward.

use thiserror::Error;

use crate::auth::VaultError;

/// Errors that can occur during an API call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error calling {path}: {source}")]
    Network {
        /// The request path that failed.
        path: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout calling {path}")]
    Timeout {
        /// The request path that timed out.
        path: String,
    },

    /// Response body was not valid JSON for the expected envelope.
    ///
    /// The raw body is preserved for diagnostics.
    #[error("undecodable response from {path}: {source}")]
    Decode {
        /// The request path whose response failed to decode.
        path: String,
        /// The raw response body, untouched.
        body: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not a usable absolute URL.
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl {
        /// The rejected URL text.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The server rejected the credentials or the session.
    #[error("authentication rejected: {message}")]
    Auth {
        /// Server-provided rejection text, or a generic fallback.
        message: String,
    },

    /// Cookie vault failure surfaced through the session bootstrap.
    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl ClientError {
    /// Creates a network error, folding reqwest timeouts into [`ClientError::Timeout`].
    pub fn network(path: impl Into<String>, source: reqwest::Error) -> Self {
        let path = path.into();
        if source.is_timeout() {
            Self::Timeout { path }
        } else {
            Self::Network { path, source }
        }
    }

    /// Creates a decode error preserving the raw body.
    pub fn decode(path: impl Into<String>, body: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            path: path.into(),
            body: body.into(),
            source,
        }
    }

    /// Creates an invalid-base-URL error.
    pub fn invalid_base_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_preserves_body() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let error = ClientError::decode("/users/login", "<html>maintenance</html>", source);
        match &error {
            ClientError::Decode { body, path, .. } => {
                assert_eq!(body, "<html>maintenance</html>");
                assert_eq!(path, "/users/login");
            }
            other => panic!("expected Decode, got: {other}"),
        }
        assert!(error.to_string().contains("/users/login"));
    }

    #[test]
    fn test_auth_error_display() {
        let error = ClientError::auth("wrong password");
        let msg = error.to_string();
        assert!(msg.contains("authentication rejected"), "got: {msg}");
        assert!(msg.contains("wrong password"), "got: {msg}");
    }
}
