// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open.
//!
//! Every call to [`seal`] draws a fresh random 96-bit nonce from the system
//! CSPRNG. No associated data is bound. Any failure to open is reported as
//! [`HaivError::AuthenticationFailure`] and no plaintext is returned.

use haiv_core::HaivError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use zeroize::Zeroizing;

use crate::{KEY_SIZE, NONCE_SIZE, TAG_SIZE, random};

fn cipher(key: &[u8; KEY_SIZE]) -> Result<LessSafeKey, HaivError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| HaivError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key`.
///
/// Returns `(ciphertext_with_tag, nonce)`. Both must be stored to decrypt.
pub fn seal(
    key: &[u8; KEY_SIZE],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_SIZE]), HaivError> {
    let cipher = cipher(key)?;
    let nonce_bytes: [u8; NONCE_SIZE] = random::random_bytes()?;

    let mut in_out = plaintext.to_vec();
    cipher
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| HaivError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt `ciphertext` (with its trailing 16-byte tag) under `key`.
pub fn open(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, HaivError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(HaivError::AuthenticationFailure);
    }
    let cipher = cipher(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = cipher
        .open_in_place(Nonce::assume_unique_for_key(*nonce), Aad::empty(), &mut in_out)
        .map_err(|_| HaivError::AuthenticationFailure)?
        .len();
    in_out.truncate(plaintext_len);
    Ok(in_out)
}

/// Decrypt with a nonce of unchecked length, as read back from storage.
pub fn open_slice(
    key: &[u8; KEY_SIZE],
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, HaivError> {
    let nonce: [u8; NONCE_SIZE] = nonce.try_into().map_err(|_| {
        HaivError::Encoding(format!(
            "nonce must be {NONCE_SIZE} bytes, got {}",
            nonce.len()
        ))
    })?;
    open(key, &nonce, ciphertext)
}
