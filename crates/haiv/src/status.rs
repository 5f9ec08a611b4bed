// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haiv status` command implementation.
//!
//! Prints bootstrap metadata only. Nothing is decrypted.

use haiv_bootstrap::{BootstrapVault, VaultStatus};
use haiv_core::HaivError;

/// Run `haiv status`. A missing bootstrap key is reported and returned as
/// a fatal error after the status is printed.
pub async fn run_status(vault: &BootstrapVault, json: bool) -> Result<(), HaivError> {
    let status = vault.status().await?;

    if json {
        println!("{}", render_status_json(&status)?);
    } else {
        print!("{}", render_status(&status));
    }

    if status.key_missing {
        return Err(HaivError::BootstrapKeyMissing);
    }
    Ok(())
}

pub fn render_status_json(status: &VaultStatus) -> Result<String, HaivError> {
    serde_json::to_string_pretty(status)
        .map_err(|e| HaivError::Encoding(format!("failed to serialize status: {e}")))
}

pub fn render_status(status: &VaultStatus) -> String {
    let mut out = String::new();

    let state = if status.initialized {
        "initialized"
    } else if status.key_missing {
        "BOOTSTRAP KEY MISSING"
    } else {
        "not initialized"
    };
    out.push_str(&format!("node:          {state}\n"));
    out.push_str(&format!(
        "bootstrap key: {}\n",
        status
            .key_source
            .map(|source| source.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    if status.audit_failures > 0 {
        out.push_str(&format!("audit failures: {}\n", status.audit_failures));
    }

    if !status.records.is_empty() {
        out.push_str("\ncredentials:\n");
        for record in &status.records {
            out.push_str(&format!(
                "  {:<24} updated {}\n",
                record.name, record.updated_at
            ));
        }
    }

    if !status.recent_rotations.is_empty() {
        out.push_str("\nrecent rotations:\n");
        for rotation in &status.recent_rotations {
            out.push_str(&format!(
                "  {} {} by {}",
                rotation.rotated_at, rotation.credential, rotation.rotated_by
            ));
            if let Some(reason) = &rotation.reason {
                out.push_str(&format!(" ({reason})"));
            }
            out.push('\n');
        }
    }

    if !status.recent_audit.is_empty() {
        out.push_str("\nrecent activity:\n");
        for entry in &status.recent_audit {
            out.push_str(&format!(
                "  {} {} by {}\n",
                entry.timestamp, entry.action, entry.actor
            ));
        }
    }

    out
}
