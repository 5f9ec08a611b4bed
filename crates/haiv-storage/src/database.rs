// SPDX-FileCopyrightText: 2026 Haiv Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lifecycle: open, PRAGMA setup, migrations.
//!
//! `Database` wraps one `tokio_rusqlite::Connection`, which runs every
//! statement on its own thread in order. Handles opened separately on the
//! same file coordinate through SQLite locking and the busy timeout.

use std::path::Path;
use std::time::Duration;

use haiv_core::HaivError;
use tracing::debug;

use crate::migrations;

/// Handle to the credential record store.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub async fn open(path: &str) -> Result<Self, HaivError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(HaivError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(HaivError::storage)?;
        let db = Self::prepare(conn, true).await?;
        debug!(path = %path, "credential store opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, HaivError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(HaivError::storage)?;
        Self::prepare(conn, false).await
    }

    async fn prepare(conn: tokio_rusqlite::Connection, wal: bool) -> Result<Self, HaivError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal {
                let _mode: String =
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", true)?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        let applied = conn
            .call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(map_tr_err)?;
        if applied > 0 {
            debug!(applied, "schema migrations applied");
        }

        Ok(Self { conn })
    }

    /// The underlying connection, for query modules.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Cheap liveness check.
    pub async fn ping(&self) -> Result<(), HaivError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Convert tokio-rusqlite errors (whatever the closure's error type) to `HaivError`.
pub fn map_tr_err<E: std::fmt::Display>(e: tokio_rusqlite::Error<E>) -> HaivError {
    HaivError::Storage {
        source: format!("credential store: {e}").into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn table_names(db: &Database) -> Vec<String> {
        db.connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/store.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let tables = table_names(&db).await;
        assert!(tables.contains(&"credential_records".to_string()));
        assert!(tables.contains(&"audit_entries".to_string()));
        assert!(tables.contains(&"rotation_history".to_string()));
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.db");
        let path = path.to_str().unwrap();

        let first = Database::open(path).await.unwrap();
        let before = table_names(&first).await;
        drop(first);

        let second = Database::open(path).await.unwrap();
        assert_eq!(table_names(&second).await, before);
    }

    #[tokio::test]
    async fn in_memory_database_is_migrated() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(table_names(&db).await.contains(&"credential_records".to_string()));
    }
}
