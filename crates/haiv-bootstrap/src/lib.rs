// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bootstrap vault for a node's own master credentials.
//!
//! A fresh node has no secret to protect its first secrets with. The
//! bootstrap vault generates a single 32-byte [`BootstrapKey`], keeps it in
//! an owner-only file (or takes it from an operator-supplied environment
//! variable), and encrypts every master credential under it with
//! AES-256-GCM before writing it to the record store.
//!
//! Losing the bootstrap key is fatal: the stored records cannot be
//! decrypted and the node must be re-initialized.

pub mod audit;
pub mod cache;
pub mod credentials;
pub mod key;
pub mod password;
pub mod secrets;
pub mod status;
pub mod vault;

pub use credentials::{CredentialName, CredentialType, SystemCredentials};
pub use key::{BootstrapKey, KeyLocation, KeySource};
pub use status::VaultStatus;
pub use vault::{BootstrapVault, Initialization};
