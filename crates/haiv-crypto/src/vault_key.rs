// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use haiv_core::HaivError;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{KEY_SIZE, random};

/// A 256-bit symmetric key protecting one vault's contents. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_SIZE]);

impl VaultKey {
    /// Draw a fresh key from the system CSPRNG.
    pub fn generate() -> Result<Self, HaivError> {
        Ok(Self(random::random_bytes()?))
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a key from a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HaivError> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            HaivError::InvalidInput(format!(
                "vault key must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn from_hex(encoded: &str) -> Result<Self, HaivError> {
        let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);
        hex::decode_to_slice(encoded.trim(), bytes.as_mut())
            .map_err(|e| HaivError::Encoding(format!("invalid vault key hex: {e}")))?;
        Ok(Self(*bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }
}

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey([REDACTED])")
    }
}
