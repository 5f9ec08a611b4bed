// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haiv rotate`, `haiv reset-password` and `haiv rotate-master-key`.

use haiv_bootstrap::{BootstrapVault, CredentialType};
use haiv_core::HaivError;
use secrecy::{ExposeSecret, SecretString};

pub async fn run_rotate(
    vault: &BootstrapVault,
    credential: CredentialType,
    rotated_by: &str,
    reason: Option<&str>,
) -> Result<(), HaivError> {
    let value = vault.rotate_credential(credential, rotated_by, reason).await?;
    println!("{credential} rotated. New value (shown once):");
    println!("{}", value.expose_secret());
    Ok(())
}

pub async fn run_reset_password(
    vault: &BootstrapVault,
    reset_by: &str,
    password: Option<String>,
) -> Result<(), HaivError> {
    let supplied = password.is_some();
    let password = vault
        .reset_admin_password(password.map(SecretString::from), reset_by)
        .await?;
    if supplied {
        println!("Admin password updated.");
    } else {
        println!("Admin password reset. New password (shown once):");
        println!("{}", password.expose_secret());
    }
    Ok(())
}

pub async fn run_rotate_master_key(
    vault: &BootstrapVault,
    rotated_by: &str,
    reason: Option<&str>,
) -> Result<(), HaivError> {
    let value = vault.rotate_vault_master_key(rotated_by, reason).await?;
    println!("Vault master key rotated. New key (shown once):");
    println!("{}", value.expose_secret());
    println!("Data encrypted under the previous key must be re-encrypted by its owner.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::tests::test_config;
    use tempfile::tempdir;

    #[tokio::test]
    async fn commands_update_the_store() {
        let dir = tempdir().unwrap();
        let vault = BootstrapVault::open(&test_config(&dir)).await.unwrap();
        vault.initialize("admin").await.unwrap();

        run_rotate(&vault, CredentialType::AgentToken, "ops", Some("test"))
            .await
            .unwrap();
        run_reset_password(&vault, "ops", Some("new-password-value".to_string()))
            .await
            .unwrap();
        run_rotate_master_key(&vault, "ops", None).await.unwrap();

        assert!(vault.verify_admin_password("new-password-value").await);
        assert_eq!(vault.status().await.unwrap().recent_rotations.len(), 3);
    }

    #[tokio::test]
    async fn unsupported_type_surfaces_error() {
        let dir = tempdir().unwrap();
        let vault = BootstrapVault::open(&test_config(&dir)).await.unwrap();
        vault.initialize("admin").await.unwrap();

        let err = run_rotate(&vault, CredentialType::AdminPassword, "ops", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HaivError::UnsupportedCredentialType(_)));
    }
}
