// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haiv init` command implementation.

use haiv_bootstrap::{BootstrapVault, Initialization};
use haiv_core::HaivError;
use secrecy::ExposeSecret;

/// Run `haiv init` and print the one-time credential bundle.
pub async fn run_init(vault: &BootstrapVault, admin_username: &str) -> Result<(), HaivError> {
    let init = vault.initialize(admin_username).await?;
    println!("{}", render_initialization(&init));
    Ok(())
}

/// Format the bundle for a single display.
pub fn render_initialization(init: &Initialization) -> String {
    let creds = &init.credentials;
    let mut out = String::new();
    out.push_str("Node initialized. SAVE THESE VALUES NOW - they will not be shown again.\n\n");
    out.push_str(&format!("  admin username   {}\n", creds.admin_username));
    out.push_str(&format!("  admin password   {}\n", init.admin_password.expose_secret()));
    out.push_str(&format!("  jwt secret       {}\n", creds.jwt_secret.expose_secret()));
    out.push_str(&format!("  admin token      {}\n", creds.admin_token.expose_secret()));
    out.push_str(&format!("  readonly token   {}\n", creds.readonly_token.expose_secret()));
    out.push_str(&format!("  agent token      {}\n", creds.agent_token.expose_secret()));
    out.push_str(&format!("  vault master key {}\n", creds.vault_master_key.expose_secret()));
    out.push_str(&format!(
        "  bootstrap key    {} (from {})\n\n",
        init.bootstrap_key.to_hex().as_str(),
        init.key_source
    ));
    out.push_str(&init.instructions);
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use haiv_config::HaivConfig;
    use tempfile::tempdir;

    pub(crate) fn test_config(dir: &tempfile::TempDir) -> HaivConfig {
        let mut config = HaivConfig::default();
        config.storage.database_path = dir.path().join("credentials.db").display().to_string();
        config.bootstrap.key_path = dir.path().join("bootstrap.key").display().to_string();
        config.bootstrap.key_env_var = "HAIV_CLI_TEST_UNSET".to_string();
        config.password.memory_cost = 1024;
        config.password.iterations = 1;
        config
    }

    #[tokio::test]
    async fn rendered_bundle_contains_every_secret() {
        let dir = tempdir().unwrap();
        let vault = BootstrapVault::open(&test_config(&dir)).await.unwrap();
        let init = vault.initialize("admin").await.unwrap();
        let text = render_initialization(&init);

        assert!(text.contains("will not be shown again"));
        assert!(text.contains(init.admin_password.expose_secret()));
        assert!(text.contains(init.credentials.agent_token.expose_secret()));
        assert!(text.contains(init.bootstrap_key.to_hex().as_str()));
        assert!(text.contains("(from file)"));
    }
}
