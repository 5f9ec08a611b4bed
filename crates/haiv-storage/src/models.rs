// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the three record-store tables.
//!
//! Timestamps are RFC 3339 strings produced by the caller.

/// One encrypted named secret.
///
/// `ciphertext` carries the 16-byte AEAD tag, so the plaintext length is
/// `ciphertext.len() - 16`.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub key_name: String,
    pub ciphertext: Vec<u8>,
    pub nonce: Vec<u8>,
    pub created_at: String,
    pub updated_at: String,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("key_name", &self.key_name)
            .field("ciphertext_len", &self.ciphertext.len())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// An audit log row. `id` is `None` until the row is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: Option<i64>,
    pub action: String,
    pub actor: String,
    pub timestamp: String,
    /// JSON object of metadata.
    pub details: String,
}

/// A rotation history row. `id` is `None` until the row is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationHistoryEntry {
    pub id: Option<i64>,
    pub credential_key: String,
    pub rotated_at: String,
    pub rotated_by: String,
    pub reason: Option<String>,
}
