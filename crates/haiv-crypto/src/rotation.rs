// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault key rotation and fan-out to authorized agents.

use std::collections::BTreeMap;

use haiv_core::HaivError;
use tracing::info;

use crate::exchange::{EncryptedVaultKey, encrypt_vault_key, generate_vault_key};
use crate::keys::{PublicKey, generate_x25519_keypair};
use crate::vault_key::VaultKey;

/// Result of one rotation event.
///
/// Nothing is persisted; the caller stores the new key, hands each share to
/// its agent, and revokes the old shares.
#[derive(Debug)]
pub struct VaultKeyRotation {
    pub new_vault_key: VaultKey,
    /// Public half of the single ephemeral keypair used for every share.
    pub rotation_public_key: PublicKey,
    pub shares: BTreeMap<String, EncryptedVaultKey>,
}

/// Generate a new vault key and encrypt it separately for every agent.
///
/// The old key is accepted for call-site symmetry but is not read: re-keying
/// the vault's contents is the caller's job. An empty agent list yields an
/// empty share map.
pub fn rotate_vault_key(
    _old_vault_key: &VaultKey,
    vault_id: &str,
    authorized_agents: &[(String, PublicKey)],
) -> Result<VaultKeyRotation, HaivError> {
    let new_vault_key = generate_vault_key()?;
    let (ephemeral, rotation_public_key) = generate_x25519_keypair();

    let mut shares = BTreeMap::new();
    for (agent_id, agent_public_key) in authorized_agents {
        if shares.contains_key(agent_id) {
            return Err(HaivError::InvalidInput(format!(
                "agent '{agent_id}' listed more than once"
            )));
        }
        let share = encrypt_vault_key(&new_vault_key, agent_public_key, &ephemeral, vault_id)?;
        shares.insert(agent_id.clone(), share);
    }

    info!(vault_id, agents = shares.len(), "vault key rotated");
    Ok(VaultKeyRotation {
        new_vault_key,
        rotation_public_key,
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::decrypt_vault_key;

    #[test]
    fn each_agent_recovers_the_same_new_key() {
        let old = generate_vault_key().unwrap();
        let (a_priv, a_pub) = generate_x25519_keypair();
        let (b_priv, b_pub) = generate_x25519_keypair();

        let rotation = rotate_vault_key(
            &old,
            "v1",
            &[("agent-a".to_string(), a_pub), ("agent-b".to_string(), b_pub)],
        )
        .unwrap();

        assert_eq!(rotation.shares.len(), 2);
        assert_ne!(rotation.new_vault_key, old);

        let share_a = &rotation.shares["agent-a"];
        let share_b = &rotation.shares["agent-b"];
        assert_eq!(decrypt_vault_key(share_a, &a_priv).unwrap(), rotation.new_vault_key);
        assert_eq!(decrypt_vault_key(share_b, &b_priv).unwrap(), rotation.new_vault_key);
        assert!(decrypt_vault_key(share_b, &a_priv).is_err());
        assert!(decrypt_vault_key(share_a, &b_priv).is_err());
    }

    #[test]
    fn shares_use_one_ephemeral_sender() {
        let old = generate_vault_key().unwrap();
        let (_, a_pub) = generate_x25519_keypair();
        let (_, b_pub) = generate_x25519_keypair();

        let rotation = rotate_vault_key(
            &old,
            "v1",
            &[("a".to_string(), a_pub), ("b".to_string(), b_pub)],
        )
        .unwrap();

        for share in rotation.shares.values() {
            assert_eq!(share.sender_public_key(), rotation.rotation_public_key);
        }
        assert_ne!(rotation.shares["a"].nonce(), rotation.shares["b"].nonce());
    }

    #[test]
    fn empty_agent_list_yields_no_shares() {
        let old = generate_vault_key().unwrap();
        let rotation = rotate_vault_key(&old, "v1", &[]).unwrap();
        assert!(rotation.shares.is_empty());
    }

    #[test]
    fn duplicate_agents_are_rejected() {
        let old = generate_vault_key().unwrap();
        let (_, a_pub) = generate_x25519_keypair();
        let err = rotate_vault_key(
            &old,
            "v1",
            &[("a".to_string(), a_pub), ("a".to_string(), a_pub)],
        )
        .unwrap_err();
        assert!(matches!(err, HaivError::InvalidInput(_)));
    }

    #[test]
    fn successive_rotations_produce_fresh_keys() {
        let old = generate_vault_key().unwrap();
        let first = rotate_vault_key(&old, "v1", &[]).unwrap();
        let second = rotate_vault_key(&first.new_vault_key, "v1", &[]).unwrap();
        assert_ne!(first.new_vault_key, second.new_vault_key);
        assert_ne!(first.rotation_public_key, second.rotation_public_key);
    }
}
