// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generators for fresh credential values.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use haiv_core::HaivError;
use haiv_crypto::random;
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::credentials::CredentialType;

pub const ADMIN_TOKEN_PREFIX: &str = "haiv_admin_";
pub const READONLY_TOKEN_PREFIX: &str = "haiv_readonly_";
pub const AGENT_TOKEN_PREFIX: &str = "haiv_agent_";

const PASSWORD_BYTES: usize = 16;
const SIGNING_SECRET_BYTES: usize = 64;
const TOKEN_BYTES: usize = 32;
const MASTER_KEY_BYTES: usize = 32;

fn urlsafe<const N: usize>() -> Result<String, HaivError> {
    let bytes = Zeroizing::new(random::random_bytes::<N>()?);
    Ok(URL_SAFE_NO_PAD.encode(bytes.as_ref()))
}

pub fn generate_admin_password() -> Result<SecretString, HaivError> {
    Ok(SecretString::from(urlsafe::<PASSWORD_BYTES>()?))
}

pub fn generate_signing_secret() -> Result<SecretString, HaivError> {
    Ok(SecretString::from(urlsafe::<SIGNING_SECRET_BYTES>()?))
}

pub fn generate_token(prefix: &str) -> Result<SecretString, HaivError> {
    let body = Zeroizing::new(urlsafe::<TOKEN_BYTES>()?);
    Ok(SecretString::from(format!("{prefix}{}", body.as_str())))
}

/// 32 random bytes as 64 hex characters.
pub fn generate_vault_master_key() -> Result<SecretString, HaivError> {
    let bytes = Zeroizing::new(random::random_bytes::<MASTER_KEY_BYTES>()?);
    Ok(SecretString::from(hex::encode(bytes.as_ref())))
}

/// A new value with the same shape as the existing credential of `kind`.
pub fn generate_for(kind: CredentialType) -> Result<SecretString, HaivError> {
    match kind {
        CredentialType::JwtSecret => generate_signing_secret(),
        CredentialType::AdminToken => generate_token(ADMIN_TOKEN_PREFIX),
        CredentialType::ReadonlyToken => generate_token(READONLY_TOKEN_PREFIX),
        CredentialType::AgentToken => generate_token(AGENT_TOKEN_PREFIX),
        CredentialType::AdminPassword => generate_admin_password(),
        CredentialType::VaultMasterKey => generate_vault_master_key(),
    }
}
