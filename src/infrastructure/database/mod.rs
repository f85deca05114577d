//! SQLite persistence for the ban list

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::errors::StorageError;
use crate::domain::entities::BanRecord;
use crate::domain::traits::BanStore;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> SqliteResult<Self> {
        let db = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        db.init_tables()?;
        Ok(db)
    }

    pub fn open_in_memory() -> SqliteResult<Self> {
        let db = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        db.init_tables()?;
        Ok(db)
    }

    /// Every statement runs to completion under the lock, so a poisoned guard is still usable
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn init_tables(&self) -> SqliteResult<()> {
        let conn = self.conn();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS bans (
                user TEXT PRIMARY KEY NOT NULL,
                reason TEXT NOT NULL,
                banned_at TEXT NOT NULL,
                banned_by TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_bans_banned_at ON bans(banned_at)",
            [],
        )?;

        Ok(())
    }
}

fn to_record(user: String, reason: String, banned_at: &str, banned_by: Option<String>) -> Result<BanRecord, StorageError> {
    let banned_at = DateTime::parse_from_rfc3339(banned_at)
        .map_err(|e| StorageError::Serialization(format!("bad banned_at for {}: {}", user, e)))?
        .with_timezone(&Utc);

    Ok(BanRecord {
        user,
        reason,
        banned_at,
        banned_by,
    })
}

impl BanStore for Database {
    fn load_bans(&self) -> Result<Vec<BanRecord>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT user, reason, banned_at, banned_by FROM bans ORDER BY banned_at")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (user, reason, banned_at, banned_by) = row?;
            records.push(to_record(user, reason, &banned_at, banned_by)?);
        }
        Ok(records)
    }

    fn save_ban(&self, record: &BanRecord) -> Result<(), StorageError> {
        self.conn().execute(
            "INSERT OR REPLACE INTO bans (user, reason, banned_at, banned_by) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                record.user,
                record.reason,
                record.banned_at.to_rfc3339(),
                record.banned_by
            ],
        )?;
        Ok(())
    }

    fn delete_ban(&self, user: &str) -> Result<bool, StorageError> {
        let rows = self.conn().execute("DELETE FROM bans WHERE user = ?1", [user])?;
        Ok(rows > 0)
    }
}
