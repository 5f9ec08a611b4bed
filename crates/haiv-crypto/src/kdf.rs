// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HKDF-SHA256 key derivation.

use haiv_core::HaivError;
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::KEY_SIZE;

/// Derive a 32-byte key from `ikm` with no salt and the given `info` string.
pub fn derive_key(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>, HaivError> {
    let hkdf = Hkdf::<Sha256>::new(None, ikm);
    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    hkdf.expand(info, okm.as_mut())
        .map_err(|e| HaivError::Crypto(format!("HKDF expand failed: {e}")))?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_key(&[7u8; 32], b"haiv-vault-key-v1:vault-1").unwrap();
        let b = derive_key(&[7u8; 32], b"haiv-vault-key-v1:vault-1").unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn info_separates_outputs() {
        let a = derive_key(&[7u8; 32], b"haiv-vault-key-v1:vault-1").unwrap();
        let b = derive_key(&[7u8; 32], b"haiv-vault-key-v1:vault-2").unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn rfc5869_case_3_prefix() {
        // RFC 5869 A.3: zero-length salt and info.
        let ikm = [0x0bu8; 22];
        let okm = derive_key(&ikm, b"").unwrap();
        assert_eq!(
            hex::encode(*okm),
            "8da4e775a563c18f715f802a063c5a31b8a11f5c5ee1879ec3454e5f3c738d2d"
        );
    }
}
