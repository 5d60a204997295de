//! Session cookie record and wire codec.
//!
//! The quiz server issues session cookie values containing literal
//! underscores where strict cookie-value grammar expects an escaped
//! backslash. Standard cookie stores reject backslashes outright, so the
//! cookie is kept out of any jar and translated at the wire boundary
//! instead: underscores become backslashes (and the value is quoted) on the
//! way out, backslashes become underscores on the way in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The single authentication cookie tracked per client instance.
///
/// Created by a successful login response or restored from the
/// [`CookieVault`](super::CookieVault); replaced whenever a response carries
/// a `Set-Cookie` header. The value is redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value, stored in decoded (underscore) form. Sensitive.
    value: String,
    /// `Domain` attribute, when the server sent one.
    pub domain: Option<String>,
    /// `Path` attribute, when the server sent one.
    pub path: Option<String>,
    /// Raw `Expires` attribute, when the server sent one.
    pub expires: Option<String>,
}

impl SessionCookie {
    /// Creates a cookie with no attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
        }
    }

    /// Returns the decoded cookie value.
    ///
    /// Cookie values are sensitive; avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Renders the `Cookie` header fragment for an outgoing request.
    ///
    /// Every underscore in the value is replaced with a backslash and the
    /// value is wrapped in double quotes: `name="escaped\value"`. This is
    /// the inverse of [`decode_set_cookie`].
    #[must_use]
    pub fn encode_for_wire(&self) -> String {
        format!("{}=\"{}\"", self.name, self.value.replace('_', "\\"))
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("expires", &self.expires)
            .finish()
    }
}

/// Parses a `Set-Cookie` header value into a [`SessionCookie`].
///
/// Backslashes in the value are replaced with underscores and surrounding
/// double quotes are stripped, undoing the server's escaping before the
/// value reaches any other consumer. `Domain`, `Path` and `Expires`
/// attributes are captured when present; everything else is ignored.
///
/// Returns `None` when the header carries no `name=value` pair.
#[must_use]
pub fn decode_set_cookie(header: &str) -> Option<SessionCookie> {
    let mut segments = header.split(';');

    let (name, raw_value) = segments.next()?.trim().split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let raw_value = raw_value.trim();
    let raw_value = raw_value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw_value);

    let mut cookie = SessionCookie::new(name, raw_value.replace('\\', "_"));

    for segment in segments {
        let segment = segment.trim();
        let (attr, attr_value) = match segment.split_once('=') {
            Some((attr, value)) => (attr.trim(), value.trim()),
            // Valueless attributes (Secure, HttpOnly) carry nothing we track.
            None => continue,
        };
        if attr.eq_ignore_ascii_case("domain") {
            cookie.domain = Some(attr_value.to_string());
        } else if attr.eq_ignore_ascii_case("path") {
            cookie.path = Some(attr_value.to_string());
        } else if attr.eq_ignore_ascii_case("expires") {
            cookie.expires = Some(attr_value.to_string());
        }
    }

    Some(cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_replaces_underscores_and_quotes() {
        let cookie = SessionCookie::new("auth", "abc_123_xyz");
        assert_eq!(cookie.encode_for_wire(), "auth=\"abc\\123\\xyz\"");
    }

    #[test]
    fn test_encode_value_without_underscores() {
        let cookie = SessionCookie::new("auth", "plain");
        assert_eq!(cookie.encode_for_wire(), "auth=\"plain\"");
    }

    #[test]
    fn test_decode_replaces_backslashes() {
        let cookie = decode_set_cookie("auth=\"abc\\123\\xyz\"").unwrap();
        assert_eq!(cookie.name, "auth");
        assert_eq!(cookie.value(), "abc_123_xyz");
    }

    #[test]
    fn test_wire_round_trip() {
        for value in ["abc_123_xyz", "no-specials", "trailing_", "_leading"] {
            let original = SessionCookie::new("auth", value);
            let decoded = decode_set_cookie(&original.encode_for_wire()).unwrap();
            assert_eq!(decoded, original, "round trip failed for value {value:?}");
        }
    }

    #[test]
    fn test_decode_captures_attributes() {
        let cookie = decode_set_cookie(
            "auth=\"tok\\en\"; Domain=.feomedia.se; Path=/; Expires=Wed, 01 Jan 2031 00:00:00 GMT; HttpOnly",
        )
        .unwrap();
        assert_eq!(cookie.value(), "tok_en");
        assert_eq!(cookie.domain.as_deref(), Some(".feomedia.se"));
        assert_eq!(cookie.path.as_deref(), Some("/"));
        assert_eq!(
            cookie.expires.as_deref(),
            Some("Wed, 01 Jan 2031 00:00:00 GMT")
        );
    }

    #[test]
    fn test_decode_unquoted_value() {
        let cookie = decode_set_cookie("sid=plainvalue; Path=/").unwrap();
        assert_eq!(cookie.value(), "plainvalue");
    }

    #[test]
    fn test_decode_rejects_header_without_pair() {
        assert!(decode_set_cookie("garbage-without-equals").is_none());
        assert!(decode_set_cookie("=value-without-name").is_none());
        assert!(decode_set_cookie("").is_none());
    }

    #[test]
    fn test_debug_redacts_value() {
        let cookie = SessionCookie::new("auth", "super_secret_token");
        let debug = format!("{cookie:?}");
        assert!(debug.contains("[REDACTED]"), "got: {debug}");
        assert!(!debug.contains("super_secret_token"), "got: {debug}");
    }
}
