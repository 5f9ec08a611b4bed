// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! X25519 keypairs and their hex encodings.

use haiv_core::HaivError;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

pub use x25519_dalek::{PublicKey, StaticSecret};

use crate::PUBLIC_KEY_SIZE;

/// Generate a fresh X25519 keypair.
pub fn generate_x25519_keypair() -> (StaticSecret, PublicKey) {
    let private = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&private);
    (private, public)
}

pub fn public_key_from_bytes(bytes: &[u8]) -> Result<PublicKey, HaivError> {
    let bytes: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
        HaivError::Encoding(format!(
            "X25519 public key must be {PUBLIC_KEY_SIZE} bytes, got {}",
            bytes.len()
        ))
    })?;
    Ok(PublicKey::from(bytes))
}

pub fn public_key_to_hex(key: &PublicKey) -> String {
    hex::encode(key.as_bytes())
}

pub fn public_key_from_hex(encoded: &str) -> Result<PublicKey, HaivError> {
    let mut bytes = [0u8; PUBLIC_KEY_SIZE];
    hex::decode_to_slice(encoded.trim(), &mut bytes)
        .map_err(|e| HaivError::Encoding(format!("invalid public key hex: {e}")))?;
    Ok(PublicKey::from(bytes))
}

pub fn private_key_to_hex(key: &StaticSecret) -> Zeroizing<String> {
    Zeroizing::new(hex::encode(key.as_bytes()))
}

pub fn private_key_from_hex(encoded: &str) -> Result<StaticSecret, HaivError> {
    let mut bytes = Zeroizing::new([0u8; PUBLIC_KEY_SIZE]);
    hex::decode_to_slice(encoded.trim(), bytes.as_mut())
        .map_err(|e| HaivError::Encoding(format!("invalid private key hex: {e}")))?;
    Ok(StaticSecret::from(*bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypairs_are_distinct() {
        let (_, a) = generate_x25519_keypair();
        let (_, b) = generate_x25519_keypair();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn hex_helpers_roundtrip() {
        let (private, public) = generate_x25519_keypair();

        let public_hex = public_key_to_hex(&public);
        assert_eq!(public_hex.len(), 64);
        assert_eq!(public_key_from_hex(&public_hex).unwrap(), public);

        let restored = private_key_from_hex(&private_key_to_hex(&private)).unwrap();
        assert_eq!(PublicKey::from(&restored), public);
    }

    #[test]
    fn malformed_public_keys_are_rejected() {
        assert!(public_key_from_bytes(&[1u8; 31]).is_err());
        assert!(public_key_from_hex("not hex").is_err());
    }
}
