// src/storage/mod.rs - SQLite persistence behind a shared handle

pub mod ledger;
pub mod settings;
pub mod warnings;

use anyhow::Result;
use log::info;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Shared database handle. All queries funnel through one connection
/// guarded by a mutex; multi-statement mutations run inside a
/// transaction via `with_conn_mut`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        run_migrations(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests and throwaway setups.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&mut conn)
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS user_points (
            chat_id             INTEGER NOT NULL,
            user_id             INTEGER NOT NULL,
            points              INTEGER NOT NULL DEFAULT 0,
            last_message_time   INTEGER,
            PRIMARY KEY (chat_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS points_history (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id         INTEGER NOT NULL,
            user_id         INTEGER NOT NULL,
            points_change   INTEGER NOT NULL,
            reason          TEXT,
            timestamp       INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_points_history_user
            ON points_history(chat_id, user_id, timestamp);

        CREATE TABLE IF NOT EXISTS warnings (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id     INTEGER NOT NULL,
            user_id     INTEGER NOT NULL,
            admin_id    INTEGER NOT NULL,
            reason      TEXT,
            timestamp   INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_warnings_user
            ON warnings(chat_id, user_id);

        CREATE TABLE IF NOT EXISTS chat_settings (
            chat_id             INTEGER PRIMARY KEY,
            welcome_message     TEXT,
            rules               TEXT,
            auto_delete_ads     INTEGER NOT NULL DEFAULT 1,
            welcome_new_members INTEGER NOT NULL DEFAULT 1,
            auto_kick_bots      INTEGER NOT NULL DEFAULT 0,
            created_at          INTEGER NOT NULL,
            updated_at          INTEGER NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
