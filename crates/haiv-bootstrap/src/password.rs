// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin password hashing with Argon2id.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`) carrying their own salt and
//! cost, so verification needs no configuration. There is no weaker fallback:
//! a hashing failure is an error.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use haiv_config::model::PasswordConfig;
use haiv_core::HaivError;
use haiv_crypto::random;
use tracing::debug;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str, params: &PasswordConfig) -> Result<String, HaivError> {
    let params = Params::new(params.memory_cost, params.iterations, params.parallelism, None)
        .map_err(|e| HaivError::Config(format!("invalid Argon2id parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let salt_bytes: [u8; 16] = random::random_bytes()?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| HaivError::Crypto(format!("failed to encode password salt: {e}")))?;

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| HaivError::Crypto(format!("Argon2id hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string. Any error yields `false`.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "stored password hash is unparseable");
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
