// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential record names, rotatable types, and the decrypted bundle.

use secrecy::SecretString;
use strum::{Display, EnumIter, EnumString};

/// Key name of each stored credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum CredentialName {
    #[strum(serialize = "admin/username")]
    AdminUsername,
    #[strum(serialize = "admin/password_hash")]
    AdminPasswordHash,
    #[strum(serialize = "admin/jwt_secret")]
    JwtSecret,
    #[strum(serialize = "api/admin_token")]
    AdminToken,
    #[strum(serialize = "api/readonly_token")]
    ReadonlyToken,
    #[strum(serialize = "api/agent_token")]
    AgentToken,
    #[strum(serialize = "vault/master_key")]
    VaultMasterKey,
    #[strum(serialize = "system/initialized_at")]
    InitializedAt,
}

impl CredentialName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminUsername => "admin/username",
            Self::AdminPasswordHash => "admin/password_hash",
            Self::JwtSecret => "admin/jwt_secret",
            Self::AdminToken => "api/admin_token",
            Self::ReadonlyToken => "api/readonly_token",
            Self::AgentToken => "api/agent_token",
            Self::VaultMasterKey => "vault/master_key",
            Self::InitializedAt => "system/initialized_at",
        }
    }
}

/// Credential kinds an operator can ask to rotate.
///
/// Only the first four go through the generic rotation path. The admin
/// password and vault master key have their own operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CredentialType {
    JwtSecret,
    AdminToken,
    ReadonlyToken,
    AgentToken,
    AdminPassword,
    VaultMasterKey,
}

impl CredentialType {
    /// Whether `rotate_credential` handles this type.
    pub fn is_generic_rotation(&self) -> bool {
        matches!(
            self,
            Self::JwtSecret | Self::AdminToken | Self::ReadonlyToken | Self::AgentToken
        )
    }

    /// The record that stores this credential.
    pub fn record_name(&self) -> CredentialName {
        match self {
            Self::JwtSecret => CredentialName::JwtSecret,
            Self::AdminToken => CredentialName::AdminToken,
            Self::ReadonlyToken => CredentialName::ReadonlyToken,
            Self::AgentToken => CredentialName::AgentToken,
            Self::AdminPassword => CredentialName::AdminPasswordHash,
            Self::VaultMasterKey => CredentialName::VaultMasterKey,
        }
    }
}

/// A node's decrypted master credentials.
///
/// Secret fields are [`SecretString`], so `Debug` output is redacted.
#[derive(Debug)]
pub struct SystemCredentials {
    pub admin_username: String,
    /// Argon2id PHC string.
    pub admin_password_hash: SecretString,
    pub jwt_secret: SecretString,
    pub admin_token: SecretString,
    pub readonly_token: SecretString,
    pub agent_token: SecretString,
    /// 64 hex characters.
    pub vault_master_key: SecretString,
    /// RFC 3339 timestamp of initialization.
    pub initialized_at: String,
}
