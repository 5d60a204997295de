//! Per-request signature and wire credential derivation.
//!
//! Every API request carries an `authorization` header the server can verify
//! independently: an HMAC-SHA256 over the full request URL, the client date
//! and the form parameter *values* (names excluded, values sorted), encoded
//! as standard base64. The same pre-shared key is used for every request.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha2::{Digest, Sha256};

use crate::config::ApiConfig;

type HmacSha256 = Hmac<Sha256>;

/// Format of the `clientdate` header and the timestamp inside the signature.
///
/// The server does not pin a timezone; this client always uses UTC so that
/// signatures are reproducible regardless of where the process runs.
const CLIENT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the current UTC time formatted for the `clientdate` header.
#[must_use]
pub fn client_date_now() -> String {
    Utc::now().format(CLIENT_DATE_FORMAT).to_string()
}

/// Computes the `authorization` header value for a request.
///
/// The signed message is `base_url + path + client_date` followed by the
/// parameter values sorted in ascending lexicographic order and concatenated
/// with no separator. Parameter names never enter the signature, so two
/// parameter sets with the same value multiset sign identically. With zero
/// parameters the signature covers only `base_url + path + client_date`.
///
/// Pure function: identical inputs always yield identical output.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sign(config: &ApiConfig, path: &str, client_date: &str, params: &[(String, String)]) -> String {
    let mut message = format!("{}{}{}", config.base_url, path, client_date);

    let mut values: Vec<&str> = params.iter().map(|(_, v)| v.as_str()).collect();
    values.sort_unstable();
    for value in values {
        message.push_str(value);
    }

    // HMAC accepts keys of any length; new_from_slice cannot fail here.
    let mut mac =
        HmacSha256::new_from_slice(config.auth_key.as_bytes()).expect("HMAC accepts any key size");
    mac.update(message.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Derives the `pwd` form field from a plaintext password.
///
/// The wire contract is `hex(md5(salt + password))`. This is reproduced
/// exactly for server compatibility; it is not a recommendation.
#[must_use]
pub fn hash_password(config: &ApiConfig, password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(config.password_salt.as_bytes());
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}
