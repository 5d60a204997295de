//! Durable storage for the session cookie.
//!
//! The vault owns the on-disk serialized form of the single tracked cookie:
//! a JSON record, optionally encrypted at rest with XChaCha20-Poly1305 when
//! a master key is available. Saves are idempotent overwrites; a missing or
//! unreadable store is a recoverable condition that callers answer with a
//! fresh login, never a fatal error.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::cookie::SessionCookie;

/// Environment variable holding the optional encryption master key.
pub const MASTER_KEY_ENV: &str = "QUIZDUELL_MASTER_KEY";

const MAGIC: &[u8; 4] = b"QDC1";
const NONCE_LEN: usize = 24;
const KEY_LEN: usize = 32;

/// Errors for persisted cookie operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// No cookie has been persisted at the vault location.
    #[error("no persisted cookie at {path}")]
    NotFound {
        /// The vault file path that does not exist.
        path: PathBuf,
    },
    /// Filesystem I/O failed.
    #[error("cookie vault I/O failed: {0}")]
    Io(#[from] io::Error),
    /// Stored bytes are not a valid serialized cookie.
    #[error("persisted cookie is not decodable: {0}")]
    Decode(#[from] serde_json::Error),
    /// Payload is encrypted but no master key is configured.
    #[error("persisted cookie is encrypted; set {MASTER_KEY_ENV}")]
    MissingKey,
    /// Encryption failed.
    #[error("failed to encrypt persisted cookie")]
    EncryptionFailed,
    /// Decryption failed (wrong key or corrupted payload).
    #[error("failed to decrypt persisted cookie")]
    DecryptionFailed,
}

impl VaultError {
    /// True for the conditions callers should treat as "no cached session".
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Decode(_) | Self::DecryptionFailed | Self::MissingKey
        )
    }
}

/// Persistence layer for exactly one session cookie.
#[derive(Debug, Clone)]
pub struct CookieVault {
    path: PathBuf,
    master_key: Option<String>,
}

impl CookieVault {
    /// Creates a vault at `path`, picking up the master key from
    /// [`MASTER_KEY_ENV`] when set. Without a key the record is stored as
    /// plain JSON with owner-only permissions.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let master_key = env::var(MASTER_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self::with_master_key(path, master_key)
    }

    /// Creates a vault with an explicit master key choice.
    #[must_use]
    pub fn with_master_key(path: impl Into<PathBuf>, master_key: Option<String>) -> Self {
        Self {
            path: path.into(),
            master_key,
        }
    }

    /// Returns the vault file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists the cookie, overwriting any previous record.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] when serialization, encryption or file writing
    /// fails.
    pub fn save(&self, cookie: &SessionCookie) -> Result<(), VaultError> {
        let plaintext = serde_json::to_vec(cookie)?;
        let payload = match &self.master_key {
            Some(key) => encrypt_payload(&plaintext, key)?,
            None => plaintext,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, payload)?;
        set_owner_only_permissions(&self.path)?;
        debug!(path = %self.path.display(), name = %cookie.name, "persisted session cookie");
        Ok(())
    }

    /// Restores the persisted cookie.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] when no record exists,
    /// [`VaultError::Decode`] when the bytes are not a valid cookie record,
    /// and key-related variants for encrypted payloads. All of these are
    /// recoverable; see [`VaultError::is_recoverable`].
    pub fn load(&self) -> Result<SessionCookie, VaultError> {
        let payload = fs::read(&self.path).map_err(|error| {
            if error.kind() == io::ErrorKind::NotFound {
                VaultError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                VaultError::Io(error)
            }
        })?;

        let plaintext = if payload.starts_with(MAGIC) {
            let key = self.master_key.as_ref().ok_or(VaultError::MissingKey)?;
            decrypt_payload(&payload, key)?
        } else {
            payload
        };

        let cookie: SessionCookie = serde_json::from_slice(&plaintext)?;
        debug!(path = %self.path.display(), name = %cookie.name, "restored session cookie");
        Ok(cookie)
    }

    /// Deletes the persisted cookie. Returns `true` when a record existed.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] when file removal fails.
    pub fn clear(&self) -> Result<bool, VaultError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(VaultError::Io(error)),
        }
    }
}

fn derive_key_bytes(key_material: &str) -> [u8; KEY_LEN] {
    let digest = Sha256::digest(key_material.as_bytes());
    let mut key = [0_u8; KEY_LEN];
    key.copy_from_slice(&digest[..KEY_LEN]);
    key
}

fn encrypt_payload(plaintext: &[u8], key_material: &str) -> Result<Vec<u8>, VaultError> {
    let key_bytes = derive_key_bytes(key_material);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key_bytes));

    let mut nonce = [0_u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| VaultError::EncryptionFailed)?;

    let mut output = Vec::with_capacity(MAGIC.len() + NONCE_LEN + ciphertext.len());
    output.extend_from_slice(MAGIC);
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn decrypt_payload(payload: &[u8], key_material: &str) -> Result<Vec<u8>, VaultError> {
    if payload.len() < MAGIC.len() + NONCE_LEN {
        return Err(VaultError::DecryptionFailed);
    }

    let key_bytes = derive_key_bytes(key_material);
    let cipher = XChaCha20Poly1305::new(Key::from_slice(&key_bytes));
    let nonce_start = MAGIC.len();
    let nonce_end = nonce_start + NONCE_LEN;
    let nonce = XNonce::from_slice(&payload[nonce_start..nonce_end]);

    cipher
        .decrypt(nonce, &payload[nonce_end..])
        .map_err(|_| VaultError::DecryptionFailed)
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), VaultError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), VaultError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sample_cookie() -> SessionCookie {
        let mut cookie = SessionCookie::new("auth", "abc_123_xyz");
        cookie.domain = Some(".feomedia.se".to_string());
        cookie.path = Some("/".to_string());
        cookie
    }

    #[test]
    fn test_plain_round_trip() {
        let tempdir = TempDir::new().unwrap();
        let vault = CookieVault::with_master_key(tempdir.path().join("cookie.json"), None);

        vault.save(&sample_cookie()).unwrap();
        let restored = vault.load().unwrap();
        assert_eq!(restored, sample_cookie());
    }

    #[test]
    fn test_encrypted_round_trip() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("cookie.enc");
        let vault = CookieVault::with_master_key(&path, Some("test-key".to_string()));

        vault.save(&sample_cookie()).unwrap();
        let restored = vault.load().unwrap();
        assert_eq!(restored, sample_cookie());

        // Encrypted payloads are magic-prefixed and do not leak the value.
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(MAGIC));
        assert!(!String::from_utf8_lossy(&bytes).contains("abc_123_xyz"));
    }

    #[test]
    fn test_save_is_idempotent_overwrite() {
        let tempdir = TempDir::new().unwrap();
        let vault = CookieVault::with_master_key(tempdir.path().join("cookie.json"), None);

        vault.save(&SessionCookie::new("auth", "first")).unwrap();
        vault.save(&SessionCookie::new("auth", "second")).unwrap();
        assert_eq!(vault.load().unwrap().value(), "second");
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let tempdir = TempDir::new().unwrap();
        let vault = CookieVault::with_master_key(tempdir.path().join("absent.json"), None);

        let error = vault.load().unwrap_err();
        assert!(matches!(error, VaultError::NotFound { .. }), "got: {error}");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("cookie.json");
        fs::write(&path, b"not a cookie record").unwrap();

        let vault = CookieVault::with_master_key(&path, None);
        let error = vault.load().unwrap_err();
        assert!(matches!(error, VaultError::Decode(_)), "got: {error}");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_load_encrypted_with_wrong_key_fails() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("cookie.enc");
        CookieVault::with_master_key(&path, Some("key-a".to_string()))
            .save(&sample_cookie())
            .unwrap();

        let error = CookieVault::with_master_key(&path, Some("key-b".to_string()))
            .load()
            .unwrap_err();
        assert!(matches!(error, VaultError::DecryptionFailed), "got: {error}");
    }

    #[test]
    fn test_load_encrypted_without_key_reports_missing_key() {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("cookie.enc");
        CookieVault::with_master_key(&path, Some("key-a".to_string()))
            .save(&sample_cookie())
            .unwrap();

        let error = CookieVault::with_master_key(&path, None).load().unwrap_err();
        assert!(matches!(error, VaultError::MissingKey), "got: {error}");
    }

    #[test]
    fn test_clear_removes_record() {
        let tempdir = TempDir::new().unwrap();
        let vault = CookieVault::with_master_key(tempdir.path().join("cookie.json"), None);

        assert!(!vault.clear().unwrap());
        vault.save(&sample_cookie()).unwrap();
        assert!(vault.clear().unwrap());
        assert!(matches!(vault.load(), Err(VaultError::NotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("cookie.json");
        CookieVault::with_master_key(&path, None)
            .save(&sample_cookie())
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
