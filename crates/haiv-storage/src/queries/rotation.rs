// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rotation history reads. Rows are written by
//! [`credentials::replace_record`](crate::queries::credentials::replace_record).

use haiv_core::HaivError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::RotationHistoryEntry;

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<RotationHistoryEntry, rusqlite::Error> {
    Ok(RotationHistoryEntry {
        id: Some(row.get(0)?),
        credential_key: row.get(1)?,
        rotated_at: row.get(2)?,
        rotated_by: row.get(3)?,
        reason: row.get(4)?,
    })
}

/// Rotations of one credential, oldest first.
pub async fn history_for(
    db: &Database,
    credential_key: &str,
) -> Result<Vec<RotationHistoryEntry>, HaivError> {
    let credential_key = credential_key.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<RotationHistoryEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, credential_key, rotated_at, rotated_by, reason
                 FROM rotation_history WHERE credential_key = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![credential_key], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent rotations across all credentials, newest first.
pub async fn recent_history(
    db: &Database,
    limit: usize,
) -> Result<Vec<RotationHistoryEntry>, HaivError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<RotationHistoryEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, credential_key, rotated_at, rotated_by, reason
                 FROM rotation_history ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
