//! SQLite-backed session store.
//!
//! Holds two things per device:
//! - the single current-session snapshot, written as four keys in a kv table
//!   (`is_fasting`, `start_time`, `update_timestamp`, `fasting_goal_id`);
//! - the append-only `fasting_history` table of completed sessions, keyed by
//!   start time.
//!
//! `read()` never fails: any underlying error is logged and the well-defined
//! empty snapshot is returned. Writes are transactional, so a failed write
//! leaves the previous snapshot intact.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{params, Connection};
use tracing::warn;

use crate::error::StoreError;
use crate::session::{HistoryRecord, SessionSnapshot};

use super::data_dir;

const KEY_IS_FASTING: &str = "is_fasting";
const KEY_START_TIME: &str = "start_time";
const KEY_UPDATE_TIMESTAMP: &str = "update_timestamp";
const KEY_GOAL_ID: &str = "fasting_goal_id";

/// Durable single-record store for the session snapshot plus history log.
///
/// Shared between the local mutation path and the sync ingress; the inner
/// connection is mutex-guarded so both can hold an `Arc<SessionStore>`.
pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    /// Open the store at `<data_dir>/fastwatch.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("fastwatch.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (tests, throwaway sessions).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS fasting_history (
                start_time_epoch_millis INTEGER PRIMARY KEY,
                end_time_epoch_millis   INTEGER NOT NULL,
                fasting_goal_id         TEXT NOT NULL
            );",
        )
        .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    /// Read the current snapshot.
    ///
    /// Never fails: an empty or unreadable store yields the default snapshot.
    pub fn read(&self) -> SessionSnapshot {
        match self.try_read() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "session read failed, returning empty snapshot");
                SessionSnapshot::empty()
            }
        }
    }

    fn try_read(&self) -> Result<SessionSnapshot, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut snapshot = SessionSnapshot::empty();
        let mut stmt = conn.prepare("SELECT key, value FROM kv")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            match key.as_str() {
                KEY_IS_FASTING => snapshot.is_fasting = value == "true",
                KEY_START_TIME => snapshot.start_time = value.parse().unwrap_or(0),
                KEY_UPDATE_TIMESTAMP => snapshot.update_timestamp = value.parse().unwrap_or(0),
                KEY_GOAL_ID => snapshot.goal_id = value,
                _ => {}
            }
        }
        Ok(snapshot)
    }

    /// Persist a snapshot. All four keys are written in one transaction.
    ///
    /// # Errors
    /// Returns an error if the transaction fails; the previous snapshot
    /// remains visible in that case.
    pub fn write(&self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let pairs: [(&str, String); 4] = [
            (KEY_IS_FASTING, snapshot.is_fasting.to_string()),
            (KEY_START_TIME, snapshot.start_time.to_string()),
            (KEY_UPDATE_TIMESTAMP, snapshot.update_timestamp.to_string()),
            (KEY_GOAL_ID, snapshot.goal_id.clone()),
        ];
        for (key, value) in pairs {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Append a completed session to the history log.
    ///
    /// Idempotent by key: a record whose start time already exists is
    /// silently ignored, not an error.
    pub fn append_history(&self, record: &HistoryRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO fasting_history
             (start_time_epoch_millis, end_time_epoch_millis, fasting_goal_id)
             VALUES (?1, ?2, ?3)",
            params![
                record.start_time_epoch_ms,
                record.end_time_epoch_ms,
                record.goal_id,
            ],
        )?;
        Ok(())
    }

    /// All history records, newest first.
    pub fn history_all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT start_time_epoch_millis, end_time_epoch_millis, fasting_goal_id
             FROM fasting_history
             ORDER BY start_time_epoch_millis DESC",
        )?;
        let rows = stmt.query_map([], row_to_record)?;
        collect_records(rows)
    }

    /// Up to `limit` records whose start falls within the trailing
    /// `window_days` before `now_ms`, newest first.
    pub fn history_recent(
        &self,
        window_days: i64,
        limit: usize,
        now_ms: i64,
    ) -> Result<Vec<HistoryRecord>, StoreError> {
        let cutoff = now_ms - window_days.saturating_mul(24 * 60 * 60 * 1000);
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT start_time_epoch_millis, end_time_epoch_millis, fasting_goal_id
             FROM fasting_history
             WHERE start_time_epoch_millis >= ?1
             ORDER BY start_time_epoch_millis DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![cutoff, limit as i64], row_to_record)?;
        collect_records(rows)
    }

    /// Delete one history record by its start time (explicit user deletion).
    ///
    /// Returns whether a record was removed.
    pub fn delete_history(&self, start_time_epoch_ms: i64) -> Result<bool, StoreError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "DELETE FROM fasting_history WHERE start_time_epoch_millis = ?1",
            params![start_time_epoch_ms],
        )?;
        Ok(changed > 0)
    }

    /// Delete every history record.
    pub fn clear_history(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM fasting_history", [])?;
        Ok(changed)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        start_time_epoch_ms: row.get(0)?,
        end_time_epoch_ms: row.get(1)?,
        goal_id: row.get(2)?,
    })
}

fn collect_records(
    rows: impl Iterator<Item = rusqlite::Result<HistoryRecord>>,
) -> Result<Vec<HistoryRecord>, StoreError> {
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}
