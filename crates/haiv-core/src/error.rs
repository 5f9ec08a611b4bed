// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Haiv credential security core.

use thiserror::Error;

/// The error type returned by every fallible Haiv operation.
///
/// Cryptographic failures fail closed: a decrypt that does not authenticate
/// surfaces as [`HaivError::AuthenticationFailure`] and never yields partial
/// plaintext.
#[derive(Debug, Error)]
pub enum HaivError {
    /// Configuration values an operation cannot run with.
    #[error("configuration error: {0}")]
    Config(String),

    /// Record store errors (open, migration, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `initialize` was called on a node that already holds credentials.
    #[error("node is already initialized")]
    AlreadyInitialized,

    /// Credentials were requested before the node was initialized.
    #[error("node is not initialized -- run `haiv init` first")]
    NotInitialized,

    /// The bootstrap key could not be found in the environment or on disk.
    ///
    /// There is no recovery path: the node must be re-initialized and every
    /// dependent secret re-issued.
    #[error("bootstrap key missing -- stored credentials are unrecoverable")]
    BootstrapKeyMissing,

    /// AEAD tag mismatch: tampering, wrong key, or wrong KDF context.
    #[error("authentication failure: ciphertext rejected")]
    AuthenticationFailure,

    /// Generic rotation was requested for a credential it does not handle.
    #[error("unsupported credential type for rotation: {0}")]
    UnsupportedCredentialType(String),

    /// A cryptographic primitive failed or is unavailable.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Malformed encoded data (blob layout, hex, base64, record shape).
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The caller supplied arguments the operation cannot accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl HaivError {
    /// Whether this error requires operator intervention rather than a retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HaivError::BootstrapKeyMissing | HaivError::Crypto(_) | HaivError::Config(_)
        )
    }

    /// Wrap a storage-layer error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HaivError::Storage {
            source: Box::new(err),
        }
    }
}
