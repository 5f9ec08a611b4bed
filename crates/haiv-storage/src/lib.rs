// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite record store for the Haiv credential security core.
//!
//! Holds three tables: encrypted credential records, the append-only audit
//! log, and credential rotation history. Each [`Database`] handle runs its
//! statements on one `tokio-rusqlite` connection; multi-row writes use
//! immediate transactions.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{AuditEntry, CredentialRecord, RotationHistoryEntry};
