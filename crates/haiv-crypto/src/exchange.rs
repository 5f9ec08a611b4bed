// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault key exchange using X25519 ECDH, HKDF-SHA256 and AES-256-GCM.
//!
//! # Protocol
//!
//! To hand a [`VaultKey`] to a recipient:
//! 1. Compute the X25519 shared secret of the sender's private key and the
//!    recipient's public key.
//! 2. Derive a 32-byte wrapping key with HKDF-SHA256 (no salt), using
//!    `haiv-vault-key-v1:` followed by the vault id as the info string.
//! 3. Seal the vault key with AES-256-GCM under a random nonce.
//!
//! The recipient redoes the ECDH with its private key and the sender public
//! key carried in the blob, re-derives the wrapping key from the carried
//! `kdf_info`, and opens the ciphertext. A relay that only sees public keys
//! and the blob learns nothing about the vault key.
//!
//! # Wire format
//!
//! ```text
//! [ version: 1 ][ nonce: 12 ][ sender_public_key: 32 ][ kdf_info_len: u16 BE ]
//! [ kdf_info: kdf_info_len ][ ciphertext + tag ]
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use haiv_core::HaivError;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::keys::{PublicKey, StaticSecret, generate_x25519_keypair};
use crate::vault_key::VaultKey;
use crate::{KEY_SIZE, NONCE_SIZE, PUBLIC_KEY_SIZE, TAG_SIZE, aead, kdf};

/// Current wire format version.
pub const FORMAT_VERSION: u8 = 1;

/// HKDF info prefix binding derived keys to this protocol.
pub const DOMAIN_PREFIX: &[u8] = b"haiv-vault-key-v1:";

const HEADER_LEN: usize = 1 + NONCE_SIZE + PUBLIC_KEY_SIZE + 2;

const MAX_KDF_INFO_LEN: usize = u16::MAX as usize;

/// A vault key encrypted for one recipient.
///
/// Built only by [`encrypt_vault_key`] or one of the decoders, so `kdf_info`
/// always fits the 2-byte length prefix of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncryptedVaultKeyFields", into = "EncryptedVaultKeyFields")]
pub struct EncryptedVaultKey {
    version: u8,
    nonce: [u8; NONCE_SIZE],
    sender_public_key: [u8; PUBLIC_KEY_SIZE],
    kdf_info: Vec<u8>,
    /// AES-256-GCM ciphertext including the 16-byte tag.
    ciphertext: Vec<u8>,
}

/// Field-per-value form of [`EncryptedVaultKey`] for transports that are not
/// binary-safe. Byte fields are standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVaultKeyFields {
    pub version: u8,
    pub nonce: String,
    pub sender_public_key: String,
    pub kdf_info: String,
    pub ciphertext: String,
}

impl EncryptedVaultKey {
    /// Encode to the binary wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.kdf_info.len() + self.ciphertext.len());
        out.push(self.version);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.sender_public_key);
        debug_assert!(self.kdf_info.len() <= MAX_KDF_INFO_LEN);
        out.extend_from_slice(&(self.kdf_info.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.kdf_info);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Decode the binary wire format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HaivError> {
        if bytes.len() < HEADER_LEN {
            return Err(HaivError::Encoding(format!(
                "encrypted vault key truncated: {} bytes, need at least {HEADER_LEN}",
                bytes.len()
            )));
        }
        let version = bytes[0];
        if version != FORMAT_VERSION {
            return Err(HaivError::Encoding(format!(
                "unsupported encrypted vault key version {version}"
            )));
        }

        let (nonce, rest) = bytes[1..].split_at(NONCE_SIZE);
        let (sender_public_key, rest) = rest.split_at(PUBLIC_KEY_SIZE);
        let (len_bytes, rest) = rest.split_at(2);
        let info_len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        if rest.len() < info_len {
            return Err(HaivError::Encoding(format!(
                "kdf_info length {info_len} exceeds remaining {} bytes",
                rest.len()
            )));
        }
        let (kdf_info, ciphertext) = rest.split_at(info_len);
        if ciphertext.len() < TAG_SIZE {
            return Err(HaivError::Encoding(format!(
                "ciphertext shorter than the {TAG_SIZE}-byte authentication tag"
            )));
        }

        let mut blob = Self {
            version,
            nonce: [0u8; NONCE_SIZE],
            sender_public_key: [0u8; PUBLIC_KEY_SIZE],
            kdf_info: kdf_info.to_vec(),
            ciphertext: ciphertext.to_vec(),
        };
        blob.nonce.copy_from_slice(nonce);
        blob.sender_public_key.copy_from_slice(sender_public_key);
        Ok(blob)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> Result<Self, HaivError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| HaivError::Encoding(format!("invalid base64: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_fields(&self) -> EncryptedVaultKeyFields {
        EncryptedVaultKeyFields {
            version: self.version,
            nonce: STANDARD.encode(self.nonce),
            sender_public_key: STANDARD.encode(self.sender_public_key),
            kdf_info: STANDARD.encode(&self.kdf_info),
            ciphertext: STANDARD.encode(&self.ciphertext),
        }
    }

    /// Rebuild from the field form, applying the same checks as
    /// [`from_bytes`](Self::from_bytes).
    pub fn from_fields(fields: &EncryptedVaultKeyFields) -> Result<Self, HaivError> {
        let decode = |name: &str, value: &str| {
            STANDARD
                .decode(value)
                .map_err(|e| HaivError::Encoding(format!("invalid base64 in {name}: {e}")))
        };
        let nonce = decode("nonce", fields.nonce.as_str())?;
        let sender_public_key = decode("sender_public_key", fields.sender_public_key.as_str())?;
        let kdf_info = decode("kdf_info", fields.kdf_info.as_str())?;
        let ciphertext = decode("ciphertext", fields.ciphertext.as_str())?;

        if nonce.len() != NONCE_SIZE {
            return Err(HaivError::Encoding(format!(
                "nonce must be {NONCE_SIZE} bytes, got {}",
                nonce.len()
            )));
        }
        if sender_public_key.len() != PUBLIC_KEY_SIZE {
            return Err(HaivError::Encoding(format!(
                "sender public key must be {PUBLIC_KEY_SIZE} bytes, got {}",
                sender_public_key.len()
            )));
        }
        if kdf_info.len() > MAX_KDF_INFO_LEN {
            return Err(HaivError::Encoding(format!(
                "kdf_info must be at most {MAX_KDF_INFO_LEN} bytes, got {}",
                kdf_info.len()
            )));
        }

        let mut bytes = Vec::with_capacity(HEADER_LEN + kdf_info.len() + ciphertext.len());
        bytes.push(fields.version);
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&sender_public_key);
        bytes.extend_from_slice(&(kdf_info.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&kdf_info);
        bytes.extend_from_slice(&ciphertext);
        Self::from_bytes(&bytes)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    pub fn sender_public_key(&self) -> PublicKey {
        PublicKey::from(self.sender_public_key)
    }

    /// HKDF info the wrapping key was derived with.
    pub fn kdf_info(&self) -> &[u8] {
        &self.kdf_info
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

impl From<EncryptedVaultKey> for EncryptedVaultKeyFields {
    fn from(blob: EncryptedVaultKey) -> Self {
        blob.to_fields()
    }
}

impl TryFrom<EncryptedVaultKeyFields> for EncryptedVaultKey {
    type Error = HaivError;

    fn try_from(fields: EncryptedVaultKeyFields) -> Result<Self, Self::Error> {
        Self::from_fields(&fields)
    }
}

/// HKDF info string for a vault: [`DOMAIN_PREFIX`] followed by the vault id.
pub fn vault_kdf_info(vault_id: &str) -> Vec<u8> {
    let mut info = Vec::with_capacity(DOMAIN_PREFIX.len() + vault_id.len());
    info.extend_from_slice(DOMAIN_PREFIX);
    info.extend_from_slice(vault_id.as_bytes());
    info
}

/// Draw a fresh random vault key.
pub fn generate_vault_key() -> Result<VaultKey, HaivError> {
    VaultKey::generate()
}

fn wrapping_key(
    private: &StaticSecret,
    peer: &PublicKey,
    kdf_info: &[u8],
) -> Result<Zeroizing<[u8; KEY_SIZE]>, HaivError> {
    let shared = private.diffie_hellman(peer);
    if !shared.was_contributory() {
        return Err(HaivError::InvalidInput(
            "peer public key is a low-order point".to_string(),
        ));
    }
    kdf::derive_key(shared.as_bytes(), kdf_info)
}

/// Encrypt `vault_key` for `recipient`, authenticated by `sender`'s key and
/// bound to `vault_id`.
pub fn encrypt_vault_key(
    vault_key: &VaultKey,
    recipient: &PublicKey,
    sender: &StaticSecret,
    vault_id: &str,
) -> Result<EncryptedVaultKey, HaivError> {
    let kdf_info = vault_kdf_info(vault_id);
    if kdf_info.len() > MAX_KDF_INFO_LEN {
        return Err(HaivError::InvalidInput(format!(
            "vault id is too long ({} bytes)",
            vault_id.len()
        )));
    }

    let key = wrapping_key(sender, recipient, &kdf_info)?;
    let (ciphertext, nonce) = aead::seal(&key, vault_key.as_bytes())?;

    debug!(vault_id, "vault key encrypted for recipient");
    Ok(EncryptedVaultKey {
        version: FORMAT_VERSION,
        nonce,
        sender_public_key: PublicKey::from(sender).to_bytes(),
        kdf_info,
        ciphertext,
    })
}

/// Decrypt a vault key with the recipient's private key.
///
/// Tampering, a wrong private key, or altered `kdf_info` all surface as
/// [`HaivError::AuthenticationFailure`].
pub fn decrypt_vault_key(
    blob: &EncryptedVaultKey,
    recipient: &StaticSecret,
) -> Result<VaultKey, HaivError> {
    if blob.version != FORMAT_VERSION {
        return Err(HaivError::Encoding(format!(
            "unsupported encrypted vault key version {}",
            blob.version
        )));
    }

    // A low-order sender key can only come from a forged blob.
    let key = wrapping_key(recipient, &blob.sender_public_key(), &blob.kdf_info).map_err(
        |e| match e {
            HaivError::InvalidInput(_) => HaivError::AuthenticationFailure,
            other => other,
        },
    )?;
    let plaintext = aead::open(&key, &blob.nonce, &blob.ciphertext)?;
    VaultKey::from_slice(&plaintext).map_err(|_| HaivError::AuthenticationFailure)
}

/// Like [`decrypt_vault_key`], but also requires the blob to be bound to
/// `vault_id`.
pub fn decrypt_vault_key_for(
    blob: &EncryptedVaultKey,
    recipient: &StaticSecret,
    vault_id: &str,
) -> Result<VaultKey, HaivError> {
    if blob.kdf_info != vault_kdf_info(vault_id) {
        return Err(HaivError::AuthenticationFailure);
    }
    decrypt_vault_key(blob, recipient)
}

/// Encrypt with a one-time sender keypair.
///
/// The ephemeral private key is returned to the caller and is not kept here.
pub fn encrypt_vault_key_with_ephemeral(
    vault_key: &VaultKey,
    recipient: &PublicKey,
    vault_id: &str,
) -> Result<(EncryptedVaultKey, StaticSecret), HaivError> {
    let (ephemeral, _) = generate_x25519_keypair();
    let blob = encrypt_vault_key(vault_key, recipient, &ephemeral, vault_id)?;
    Ok((blob, ephemeral))
}

/// Decrypt with `current` and re-encrypt for `new_recipient`, using `current`
/// as the new sender key.
pub fn reencrypt_for_new_recipient(
    blob: &EncryptedVaultKey,
    current: &StaticSecret,
    new_recipient: &PublicKey,
    vault_id: &str,
) -> Result<EncryptedVaultKey, HaivError> {
    let vault_key = decrypt_vault_key(blob, current)?;
    encrypt_vault_key(&vault_key, new_recipient, current, vault_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn blob_for(vault_id: &str) -> (VaultKey, EncryptedVaultKey, StaticSecret) {
        let (alice, _) = generate_x25519_keypair();
        let (bob, bob_pub) = generate_x25519_keypair();
        let key = generate_vault_key().unwrap();
        let blob = encrypt_vault_key(&key, &bob_pub, &alice, vault_id).unwrap();
        (key, blob, bob)
    }

    #[test]
    fn recipient_recovers_key() {
        let (key, blob, bob) = blob_for("vault-1");
        assert_eq!(decrypt_vault_key(&blob, &bob).unwrap(), key);
        assert_eq!(decrypt_vault_key_for(&blob, &bob, "vault-1").unwrap(), key);
    }

    #[test]
    fn blob_records_sender_and_context() {
        let (alice, alice_pub) = generate_x25519_keypair();
        let (_, bob_pub) = generate_x25519_keypair();
        let key = generate_vault_key().unwrap();
        let blob = encrypt_vault_key(&key, &bob_pub, &alice, "vault-1").unwrap();

        assert_eq!(blob.version, FORMAT_VERSION);
        assert_eq!(blob.sender_public_key(), alice_pub);
        assert_eq!(blob.kdf_info, b"haiv-vault-key-v1:vault-1");
        assert_eq!(blob.ciphertext.len(), KEY_SIZE + TAG_SIZE);
    }

    #[test]
    fn vault_ids_separate_keys() {
        let (alice, _) = generate_x25519_keypair();
        let (bob, bob_pub) = generate_x25519_keypair();
        let key = generate_vault_key().unwrap();

        let one = encrypt_vault_key(&key, &bob_pub, &alice, "vault-1").unwrap();
        let two = encrypt_vault_key(&key, &bob_pub, &alice, "vault-2").unwrap();
        assert_ne!(one.ciphertext, two.ciphertext);

        let err = decrypt_vault_key_for(&one, &bob, "vault-2").unwrap_err();
        assert!(matches!(err, HaivError::AuthenticationFailure));

        // Swapping in the other vault's context must break the tag.
        let mut swapped = one.clone();
        swapped.kdf_info = vault_kdf_info("vault-2");
        let err = decrypt_vault_key(&swapped, &bob).unwrap_err();
        assert!(matches!(err, HaivError::AuthenticationFailure));
    }

    #[test]
    fn every_bit_flip_is_detected() {
        let (_, blob, bob) = blob_for("vault-1");

        for byte in 0..NONCE_SIZE {
            for bit in 0..8 {
                let mut tampered = blob.clone();
                tampered.nonce[byte] ^= 1 << bit;
                assert!(
                    matches!(
                        decrypt_vault_key(&tampered, &bob),
                        Err(HaivError::AuthenticationFailure)
                    ),
                    "nonce byte {byte} bit {bit}"
                );
            }
        }
        for byte in 0..blob.ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = blob.clone();
                tampered.ciphertext[byte] ^= 1 << bit;
                assert!(
                    matches!(
                        decrypt_vault_key(&tampered, &bob),
                        Err(HaivError::AuthenticationFailure)
                    ),
                    "ciphertext byte {byte} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn other_private_keys_are_rejected() {
        let (_, blob, _) = blob_for("vault-1");
        for _ in 0..8 {
            let (mallory, _) = generate_x25519_keypair();
            assert!(decrypt_vault_key(&blob, &mallory).is_err());
        }
    }

    #[test]
    fn ephemeral_senders_are_independent() {
        let (_, bob_pub) = generate_x25519_keypair();
        let key = generate_vault_key().unwrap();

        let (first, eph1) = encrypt_vault_key_with_ephemeral(&key, &bob_pub, "vault-1").unwrap();
        let (second, eph2) = encrypt_vault_key_with_ephemeral(&key, &bob_pub, "vault-1").unwrap();

        assert_ne!(first.sender_public_key, second.sender_public_key);
        assert_ne!(first.ciphertext, second.ciphertext);
        assert_eq!(first.sender_public_key(), PublicKey::from(&eph1));
        assert_eq!(second.sender_public_key(), PublicKey::from(&eph2));
    }

    #[test]
    fn reencryption_hands_key_to_new_recipient() {
        let (key, blob, bob) = blob_for("vault-1");
        let bob_pub = PublicKey::from(&bob);
        let (carol, carol_pub) = generate_x25519_keypair();

        let forwarded = reencrypt_for_new_recipient(&blob, &bob, &carol_pub, "vault-1").unwrap();
        assert_eq!(forwarded.sender_public_key(), bob_pub);
        assert_eq!(decrypt_vault_key(&forwarded, &carol).unwrap(), key);
        assert!(decrypt_vault_key(&forwarded, &bob).is_err());
    }

    #[test]
    fn low_order_public_keys_are_rejected() {
        let (alice, _) = generate_x25519_keypair();
        let key = generate_vault_key().unwrap();
        let identity = PublicKey::from([0u8; PUBLIC_KEY_SIZE]);
        let err = encrypt_vault_key(&key, &identity, &alice, "vault-1").unwrap_err();
        assert!(matches!(err, HaivError::InvalidInput(_)));
    }

    #[test]
    fn forged_low_order_sender_fails_authentication() {
        let (_, blob, bob) = blob_for("vault-1");
        let mut forged = blob.clone();
        forged.sender_public_key = [0u8; PUBLIC_KEY_SIZE];

        let err = decrypt_vault_key(&forged, &bob).unwrap_err();
        assert!(matches!(err, HaivError::AuthenticationFailure));
    }

    #[test]
    fn oversized_kdf_info_never_reaches_the_wire() {
        let (alice, _) = generate_x25519_keypair();
        let (_, bob_pub) = generate_x25519_keypair();
        let key = generate_vault_key().unwrap();

        let long_id = "a".repeat(70_000);
        let err = encrypt_vault_key(&key, &bob_pub, &alice, &long_id).unwrap_err();
        assert!(matches!(err, HaivError::InvalidInput(_)));

        let (_, blob, _) = blob_for("vault-1");
        let mut fields = blob.to_fields();
        fields.kdf_info = STANDARD.encode(vec![b'a'; 70_000]);
        let err = EncryptedVaultKey::from_fields(&fields).unwrap_err();
        assert!(matches!(err, HaivError::Encoding(_)));

        let json = serde_json::to_string(&fields).unwrap();
        assert!(serde_json::from_str::<EncryptedVaultKey>(&json).is_err());
    }

    #[test]
    fn longest_kdf_info_round_trips() {
        let (alice, _) = generate_x25519_keypair();
        let (bob, bob_pub) = generate_x25519_keypair();
        let key = generate_vault_key().unwrap();

        let vault_id = "v".repeat(MAX_KDF_INFO_LEN - DOMAIN_PREFIX.len());
        let blob = encrypt_vault_key(&key, &bob_pub, &alice, &vault_id).unwrap();
        assert_eq!(blob.kdf_info().len(), MAX_KDF_INFO_LEN);

        let decoded = EncryptedVaultKey::from_bytes(&blob.to_bytes()).unwrap();
        assert_eq!(decoded, blob);
        assert_eq!(decrypt_vault_key_for(&decoded, &bob, &vault_id).unwrap(), key);
    }

    #[test]
    fn encodings_are_lossless() {
        let (key, blob, bob) = blob_for("vault-1");

        let bytes = blob.to_bytes();
        assert_eq!(bytes[0], FORMAT_VERSION);
        assert_eq!(
            u16::from_be_bytes([bytes[45], bytes[46]]) as usize,
            blob.kdf_info.len()
        );
        assert_eq!(EncryptedVaultKey::from_bytes(&bytes).unwrap(), blob);
        assert_eq!(EncryptedVaultKey::from_base64(&blob.to_base64()).unwrap(), blob);
        assert_eq!(EncryptedVaultKey::from_fields(&blob.to_fields()).unwrap(), blob);

        let json = serde_json::to_string(&blob).unwrap();
        let parsed: EncryptedVaultKey = serde_json::from_str(&json).unwrap();
        assert_eq!(decrypt_vault_key(&parsed, &bob).unwrap(), key);
    }

    #[test]
    fn malformed_wire_input_is_rejected() {
        let (_, blob, _) = blob_for("vault-1");
        let bytes = blob.to_bytes();

        assert!(EncryptedVaultKey::from_bytes(&bytes[..HEADER_LEN - 1]).is_err());

        let mut wrong_version = bytes.clone();
        wrong_version[0] = 2;
        assert!(EncryptedVaultKey::from_bytes(&wrong_version).is_err());

        let short_tag = &bytes[..HEADER_LEN + blob.kdf_info.len() + TAG_SIZE - 1];
        assert!(EncryptedVaultKey::from_bytes(short_tag).is_err());

        let mut long_info = bytes.clone();
        long_info[45] = 0xff;
        long_info[46] = 0xff;
        assert!(EncryptedVaultKey::from_bytes(&long_info).is_err());

        assert!(EncryptedVaultKey::from_base64("%%%").is_err());

        let mut fields = blob.to_fields();
        fields.nonce = STANDARD.encode([0u8; 8]);
        assert!(EncryptedVaultKey::from_fields(&fields).is_err());
    }

    proptest! {
        #[test]
        fn roundtrip_for_any_key_and_vault(
            key_bytes in any::<[u8; KEY_SIZE]>(),
            vault_id in "[a-zA-Z0-9_-]{1,48}",
        ) {
            let (alice, _) = generate_x25519_keypair();
            let (bob, bob_pub) = generate_x25519_keypair();
            let key = VaultKey::from_bytes(key_bytes);

            let blob = encrypt_vault_key(&key, &bob_pub, &alice, &vault_id).unwrap();
            let wire = EncryptedVaultKey::from_base64(&blob.to_base64()).unwrap();
            prop_assert_eq!(decrypt_vault_key_for(&wire, &bob, &vault_id).unwrap(), key);
        }
    }
}
