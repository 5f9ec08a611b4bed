// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metadata-only view of a node's bootstrap state. Never carries secrets.

use serde::Serialize;

use crate::key::KeySource;

#[derive(Debug, Clone, Serialize)]
pub struct VaultStatus {
    pub initialized: bool,
    /// `None` when no key is available from either source.
    pub key_source: Option<KeySource>,
    /// Records exist but the key cannot be found. Unrecoverable.
    pub key_missing: bool,
    pub records: Vec<RecordStatus>,
    pub recent_audit: Vec<AuditSummary>,
    pub recent_rotations: Vec<RotationSummary>,
    pub audit_failures: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordStatus {
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub action: String,
    pub actor: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RotationSummary {
    pub credential: String,
    pub rotated_at: String,
    pub rotated_by: String,
    pub reason: Option<String>,
}
