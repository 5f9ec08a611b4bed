// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bootstrap key and where it lives.

use std::io::Write;
use std::path::{Path, PathBuf};

use haiv_config::model::BootstrapConfig;
use haiv_core::HaivError;
use haiv_crypto::{KEY_SIZE, random};
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// The node's single local secret. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BootstrapKey([u8; KEY_SIZE]);

impl BootstrapKey {
    pub fn generate() -> Result<Self, HaivError> {
        Ok(Self(random::random_bytes()?))
    }

    pub fn from_hex(encoded: &str) -> Result<Self, HaivError> {
        let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
        hex::decode_to_slice(encoded.trim(), bytes.as_mut())
            .map_err(|e| HaivError::Encoding(format!("bootstrap key is not 64 hex chars: {e}")))?;
        Ok(Self(*bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// 64 lowercase hex characters.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }
}

impl std::fmt::Debug for BootstrapKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BootstrapKey([REDACTED])")
    }
}

/// Where a loaded key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum KeySource {
    Environment,
    File,
}

/// File path and environment variable that may hold the bootstrap key.
#[derive(Debug, Clone)]
pub struct KeyLocation {
    pub path: PathBuf,
    pub env_var: String,
}

impl KeyLocation {
    pub fn new(path: impl Into<PathBuf>, env_var: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            env_var: env_var.into(),
        }
    }

    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self::new(&config.key_path, &config.key_env_var)
    }

    /// The key from the environment variable, if set to well-formed hex.
    ///
    /// A malformed value is logged and ignored so the file can be used.
    pub fn env_key(&self) -> Option<BootstrapKey> {
        let value = Zeroizing::new(std::env::var(&self.env_var).ok()?);
        if value.trim().is_empty() {
            return None;
        }
        match BootstrapKey::from_hex(&value) {
            Ok(key) => Some(key),
            Err(_) => {
                warn!(
                    env_var = %self.env_var,
                    "bootstrap key environment variable is not valid hex, falling back to key file"
                );
                None
            }
        }
    }

    /// Whether a key is available from either source.
    pub fn exists(&self) -> bool {
        self.env_key().is_some() || self.path.is_file()
    }

    /// Load the key, environment variable first.
    ///
    /// Returns `Ok(None)` when neither source holds a key. A key file that
    /// exists but cannot be parsed is an error.
    pub fn load(&self) -> Result<Option<(BootstrapKey, KeySource)>, HaivError> {
        if let Some(key) = self.env_key() {
            return Ok(Some((key, KeySource::Environment)));
        }
        if !self.path.is_file() {
            return Ok(None);
        }
        let contents = Zeroizing::new(
            std::fs::read_to_string(&self.path).map_err(|e| self.io_error("read", e))?,
        );
        let key = BootstrapKey::from_hex(&contents)?;
        debug!(path = %self.path.display(), "bootstrap key loaded from file");
        Ok(Some((key, KeySource::File)))
    }

    /// Write the key as hex to the key file with owner-only permissions.
    ///
    /// The key is written to a temporary sibling first and renamed into
    /// place, so readers never observe a partial file.
    pub fn persist(&self, key: &BootstrapKey) -> Result<(), HaivError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| self.io_error("create directory for", e))?;

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bootstrap.key".to_string());
        let tmp_path = parent.join(format!(".{file_name}.tmp"));

        write_owner_only(&tmp_path, key.to_hex().as_bytes())
            .map_err(|e| self.io_error("write", e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            self.io_error("install", e)
        })?;

        debug!(path = %self.path.display(), "bootstrap key persisted");
        Ok(())
    }

    fn io_error(&self, verb: &str, e: std::io::Error) -> HaivError {
        HaivError::storage(std::io::Error::new(
            e.kind(),
            format!("failed to {verb} bootstrap key file {}: {e}", self.path.display()),
        ))
    }
}

#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation; tighten a leftover file too.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn key_hex_is_64_chars() {
        let key = BootstrapKey::generate().unwrap();
        let encoded = key.to_hex();
        assert_eq!(encoded.len(), 64);
        assert_eq!(BootstrapKey::from_hex(&encoded).unwrap(), key);
    }

    #[test]
    fn debug_is_redacted() {
        let key = BootstrapKey::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(format!("{key:?}"), "BootstrapKey([REDACTED])");
    }

    #[test]
    fn persist_then_load_from_file() {
        let dir = tempdir().unwrap();
        let location = KeyLocation::new(dir.path().join("nested/bootstrap.key"), "HAIV_TEST_KEY_UNSET_1");
        assert!(!location.exists());
        assert!(location.load().unwrap().is_none());

        let key = BootstrapKey::generate().unwrap();
        location.persist(&key).unwrap();

        assert!(location.exists());
        let (loaded, source) = location.load().unwrap().unwrap();
        assert_eq!(loaded, key);
        assert_eq!(source, KeySource::File);
        assert!(!dir.path().join("nested/.bootstrap.key.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let location = KeyLocation::new(dir.path().join("bootstrap.key"), "HAIV_TEST_KEY_UNSET_2");
        location.persist(&BootstrapKey::generate().unwrap()).unwrap();

        let mode = std::fs::metadata(&location.path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_key_file_is_an_error() {
        let dir = tempdir().unwrap();
        let location = KeyLocation::new(dir.path().join("bootstrap.key"), "HAIV_TEST_KEY_UNSET_3");
        std::fs::write(&location.path, "not a key").unwrap();
        assert!(matches!(location.load(), Err(HaivError::Encoding(_))));
    }

    #[test]
    #[serial]
    fn env_var_takes_precedence() {
        let dir = tempdir().unwrap();
        let location = KeyLocation::new(dir.path().join("bootstrap.key"), "HAIV_TEST_KEY_ENV");
        let file_key = BootstrapKey::generate().unwrap();
        location.persist(&file_key).unwrap();

        let env_key = BootstrapKey::generate().unwrap();
        unsafe { std::env::set_var("HAIV_TEST_KEY_ENV", env_key.to_hex().as_str()) };
        let (loaded, source) = location.load().unwrap().unwrap();
        unsafe { std::env::remove_var("HAIV_TEST_KEY_ENV") };

        assert_eq!(loaded, env_key);
        assert_eq!(source, KeySource::Environment);
    }

    #[test]
    #[serial]
    fn malformed_env_var_falls_back_to_file() {
        let dir = tempdir().unwrap();
        let location = KeyLocation::new(dir.path().join("bootstrap.key"), "HAIV_TEST_KEY_BAD");
        let file_key = BootstrapKey::generate().unwrap();
        location.persist(&file_key).unwrap();

        unsafe { std::env::set_var("HAIV_TEST_KEY_BAD", "zz-not-hex") };
        let loaded = location.load().unwrap();
        unsafe { std::env::remove_var("HAIV_TEST_KEY_BAD") };

        let (loaded, source) = loaded.unwrap();
        assert_eq!(loaded, file_key);
        assert_eq!(source, KeySource::File);
    }

    #[test]
    #[serial]
    fn env_only_key_counts_as_present() {
        let dir = tempdir().unwrap();
        let location = KeyLocation::new(dir.path().join("bootstrap.key"), "HAIV_TEST_KEY_ONLY");
        unsafe { std::env::set_var("HAIV_TEST_KEY_ONLY", "11".repeat(32)) };
        let exists = location.exists();
        unsafe { std::env::remove_var("HAIV_TEST_KEY_ONLY") };
        assert!(exists);
        assert!(!location.exists());
    }
}
