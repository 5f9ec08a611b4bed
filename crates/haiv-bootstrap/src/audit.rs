// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort audit trail for bootstrap lifecycle events.
//!
//! A failed audit write never fails the operation that triggered it. The
//! failure is logged and counted instead.

use std::sync::atomic::{AtomicU64, Ordering};

use haiv_storage::Database;
use haiv_storage::models::AuditEntry;
use haiv_storage::queries::audit;
use tracing::warn;

/// Audit actions written by the bootstrap vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    SystemInitialized,
    CredentialsLoaded,
    CredentialRotated,
    AdminPasswordReset,
    VaultMasterKeyRotated,
}

#[derive(Debug)]
pub struct AuditLog {
    db: Database,
    failures: AtomicU64,
}

impl AuditLog {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            failures: AtomicU64::new(0),
        }
    }

    /// Append an entry. `details` must hold metadata only, never secret values.
    pub async fn record(&self, action: AuditAction, actor: &str, details: serde_json::Value) {
        let entry = AuditEntry {
            id: None,
            action: action.to_string(),
            actor: actor.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: details.to_string(),
        };
        if let Err(e) = audit::append_entry(&self.db, &entry).await {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!(action = %action, error = %e, "audit write failed");
        }
    }

    /// Number of audit writes that failed since this log was created.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
