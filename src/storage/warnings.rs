// src/storage/warnings.rs - Per-user warning records

use anyhow::Result;
use rusqlite::params;

use crate::types::Warning;

use super::Database;

impl Database {
    /// Record a warning and return the user's total, both inside one
    /// transaction so concurrent warns never read a stale count.
    pub fn add_warning(
        &self,
        chat_id: i64,
        user_id: i64,
        admin_id: i64,
        reason: Option<&str>,
    ) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO warnings (chat_id, user_id, admin_id, reason, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![chat_id, user_id, admin_id, reason, now],
            )?;
            let count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM warnings WHERE chat_id = ?1 AND user_id = ?2",
                params![chat_id, user_id],
                |row| row.get(0),
            )?;
            tx.commit()?;
            Ok(count)
        })
    }

    /// Active warning count for a user.
    pub fn warning_count(&self, chat_id: i64, user_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM warnings WHERE chat_id = ?1 AND user_id = ?2",
                params![chat_id, user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Remove every warning for a user, returning how many were removed.
    pub fn clear_warnings(&self, chat_id: i64, user_id: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM warnings WHERE chat_id = ?1 AND user_id = ?2",
                params![chat_id, user_id],
            )?;
            Ok(removed)
        })
    }

    /// A user's warnings, newest first.
    pub fn warnings(&self, chat_id: i64, user_id: i64) -> Result<Vec<Warning>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT admin_id, reason, timestamp FROM warnings
                 WHERE chat_id = ?1 AND user_id = ?2
                 ORDER BY timestamp DESC, id DESC",
            )?;
            let rows = stmt
                .query_map(params![chat_id, user_id], |row| {
                    Ok(Warning {
                        admin_id: row.get(0)?,
                        reason: row.get(1)?,
                        timestamp: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: i64 = -1001;
    const ADMIN: i64 = 500;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn counts_accumulate_per_user() {
        let db = db();
        assert_eq!(db.add_warning(CHAT, 1, ADMIN, Some("spam")).unwrap(), 1);
        assert_eq!(db.add_warning(CHAT, 1, ADMIN, None).unwrap(), 2);
        assert_eq!(db.add_warning(CHAT, 2, ADMIN, Some("ads")).unwrap(), 1);

        assert_eq!(db.warning_count(CHAT, 1).unwrap(), 2);
        assert_eq!(db.warning_count(CHAT, 2).unwrap(), 1);
        assert_eq!(db.warning_count(CHAT, 3).unwrap(), 0);
    }

    #[test]
    fn counts_are_scoped_per_chat() {
        let db = db();
        db.add_warning(-1, 1, ADMIN, None).unwrap();
        db.add_warning(-2, 1, ADMIN, None).unwrap();
        assert_eq!(db.warning_count(-1, 1).unwrap(), 1);
        assert_eq!(db.warning_count(-2, 1).unwrap(), 1);
    }

    #[test]
    fn clear_reports_removed_and_resets() {
        let db = db();
        db.add_warning(CHAT, 1, ADMIN, Some("spam")).unwrap();
        db.add_warning(CHAT, 1, ADMIN, Some("flood")).unwrap();
        db.add_warning(CHAT, 1, ADMIN, Some("ads")).unwrap();

        assert_eq!(db.clear_warnings(CHAT, 1).unwrap(), 3);
        assert_eq!(db.warning_count(CHAT, 1).unwrap(), 0);
        assert_eq!(db.clear_warnings(CHAT, 1).unwrap(), 0);

        // The next warning starts a fresh count.
        assert_eq!(db.add_warning(CHAT, 1, ADMIN, None).unwrap(), 1);
    }

    #[test]
    fn listing_returns_reasons_newest_first() {
        let db = db();
        db.add_warning(CHAT, 1, ADMIN, Some("first")).unwrap();
        db.add_warning(CHAT, 1, ADMIN, Some("second")).unwrap();

        let warnings = db.warnings(CHAT, 1).unwrap();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].reason.as_deref(), Some("second"));
        assert_eq!(warnings[1].reason.as_deref(), Some("first"));
        assert_eq!(warnings[0].admin_id, ADMIN);
    }
}
