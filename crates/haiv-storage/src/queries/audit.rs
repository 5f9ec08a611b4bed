// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit log.

use haiv_core::HaivError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::AuditEntry;

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<AuditEntry, rusqlite::Error> {
    Ok(AuditEntry {
        id: Some(row.get(0)?),
        action: row.get(1)?,
        actor: row.get(2)?,
        timestamp: row.get(3)?,
        details: row.get(4)?,
    })
}

/// Append an entry and return its row id.
pub async fn append_entry(db: &Database, entry: &AuditEntry) -> Result<i64, HaivError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO audit_entries (action, actor, timestamp, details)
                 VALUES (?1, ?2, ?3, ?4)",
                params![entry.action, entry.actor, entry.timestamp, entry.details],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent entries, newest first.
pub async fn recent_entries(db: &Database, limit: usize) -> Result<Vec<AuditEntry>, HaivError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<AuditEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, action, actor, timestamp, details
                 FROM audit_entries ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// All entries recorded for one action, oldest first.
pub async fn entries_for_action(db: &Database, action: &str) -> Result<Vec<AuditEntry>, HaivError> {
    let action = action.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<AuditEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, action, actor, timestamp, details
                 FROM audit_entries WHERE action = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![action], row_to_entry)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: &str) -> AuditEntry {
        AuditEntry {
            id: None,
            action: action.to_string(),
            actor: "admin".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            details: "{}".to_string(),
        }
    }

    #[tokio::test]
    async fn append_and_read_back() {
        let db = Database::open_in_memory().await.unwrap();
        let first = append_entry(&db, &entry("system_initialized")).await.unwrap();
        let second = append_entry(&db, &entry("credentials_loaded")).await.unwrap();
        assert!(second > first);

        let recent = recent_entries(&db, 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, "credentials_loaded");
        assert_eq!(recent[1].id, Some(first));

        let loads = entries_for_action(&db, "credentials_loaded").await.unwrap();
        assert_eq!(loads.len(), 1);
    }

    #[tokio::test]
    async fn entries_cannot_be_rewritten() {
        let db = Database::open_in_memory().await.unwrap();
        append_entry(&db, &entry("system_initialized")).await.unwrap();

        let result = db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute("UPDATE audit_entries SET actor = 'mallory'", [])
            })
            .await;
        assert!(result.is_err());

        let result = db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute("DELETE FROM audit_entries", [])
            })
            .await;
        assert!(result.is_err());
    }
}
