// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cryptographic primitives and the vault key exchange protocol.
//!
//! - [`aead`]: AES-256-GCM seal/open with random 96-bit nonces.
//! - [`kdf`]: HKDF-SHA256 key derivation.
//! - [`keys`]: X25519 keypair generation and encoding helpers.
//! - [`exchange`]: ECDH + HKDF + AEAD encryption of a [`VaultKey`] for one
//!   recipient, and the [`EncryptedVaultKey`] wire format.
//! - [`rotation`]: fresh vault key fan-out to a set of authorized agents.
//!
//! Nothing in this crate holds state; every function may be called
//! concurrently.

pub mod aead;
pub mod exchange;
pub mod kdf;
pub mod keys;
pub mod random;
pub mod rotation;
pub mod vault_key;

pub use exchange::{
    EncryptedVaultKey, EncryptedVaultKeyFields, decrypt_vault_key, decrypt_vault_key_for,
    encrypt_vault_key, encrypt_vault_key_with_ephemeral, generate_vault_key,
    reencrypt_for_new_recipient, vault_kdf_info,
};
pub use keys::{PublicKey, StaticSecret, generate_x25519_keypair};
pub use rotation::{VaultKeyRotation, rotate_vault_key};
pub use vault_key::VaultKey;

/// Symmetric key size in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// X25519 public key size in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;
