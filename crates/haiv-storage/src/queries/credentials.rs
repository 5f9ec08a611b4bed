// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential record operations.

use haiv_core::HaivError;
use rusqlite::{TransactionBehavior, params};

use crate::database::{Database, map_tr_err};
use crate::models::{CredentialRecord, RotationHistoryEntry};

const SELECT_COLUMNS: &str = "SELECT key_name, ciphertext, nonce, created_at, updated_at
     FROM credential_records";

fn row_to_record(row: &rusqlite::Row<'_>) -> Result<CredentialRecord, rusqlite::Error> {
    Ok(CredentialRecord {
        key_name: row.get(0)?,
        ciphertext: row.get(1)?,
        nonce: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Number of stored credential records.
pub async fn count_records(db: &Database) -> Result<i64, HaivError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM credential_records", [], |row| {
                row.get(0)
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one record by key name.
pub async fn get_record(
    db: &Database,
    key_name: &str,
) -> Result<Option<CredentialRecord>, HaivError> {
    let key_name = key_name.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<CredentialRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE key_name = ?1"))?;
            match stmt.query_row(params![key_name], row_to_record) {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All records, ordered by key name.
pub async fn list_records(db: &Database) -> Result<Vec<CredentialRecord>, HaivError> {
    db.connection()
        .call(|conn| -> Result<Vec<CredentialRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY key_name"))?;
            let rows = stmt.query_map([], row_to_record)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert the initial record set in one immediate transaction.
///
/// Returns `false` without writing anything if any record already exists, so
/// of several concurrent callers exactly one observes `true`.
pub async fn insert_initial_records(
    db: &Database,
    records: Vec<CredentialRecord>,
) -> Result<bool, HaivError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let existing: i64 =
                tx.query_row("SELECT COUNT(*) FROM credential_records", [], |row| {
                    row.get(0)
                })?;
            if existing > 0 {
                return Ok(false);
            }
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO credential_records (key_name, ciphertext, nonce, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for record in &records {
                    stmt.execute(params![
                        record.key_name,
                        record.ciphertext,
                        record.nonce,
                        record.created_at,
                        record.updated_at,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite one record's ciphertext and nonce and append a history row,
/// atomically. `created_at` of an existing record is preserved.
pub async fn replace_record(
    db: &Database,
    record: CredentialRecord,
    history: RotationHistoryEntry,
) -> Result<(), HaivError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO credential_records (key_name, ciphertext, nonce, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(key_name) DO UPDATE SET
                     ciphertext = excluded.ciphertext,
                     nonce = excluded.nonce,
                     updated_at = excluded.updated_at",
                params![
                    record.key_name,
                    record.ciphertext,
                    record.nonce,
                    record.created_at,
                    record.updated_at,
                ],
            )?;
            tx.execute(
                "INSERT INTO rotation_history (credential_key, rotated_at, rotated_by, reason)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    history.credential_key,
                    history.rotated_at,
                    history.rotated_by,
                    history.reason,
                ],
            )?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Remove every credential record. Used to undo a half-finished initialization.
pub async fn delete_all_records(db: &Database) -> Result<usize, HaivError> {
    db.connection()
        .call(|conn| -> Result<usize, rusqlite::Error> {
            conn.execute("DELETE FROM credential_records", [])
        })
        .await
        .map_err(map_tr_err)
}
