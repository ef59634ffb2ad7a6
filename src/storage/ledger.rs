// src/storage/ledger.rs - Reputation point ledger with full history

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use crate::types::{LeaderboardEntry, PointsEntry};

use super::Database;

impl Database {
    /// Current balance for a user, 0 if they have never been seen.
    pub fn balance(&self, chat_id: i64, user_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let points: Option<i64> = conn
                .query_row(
                    "SELECT points FROM user_points WHERE chat_id = ?1 AND user_id = ?2",
                    params![chat_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(points.unwrap_or(0))
        })
    }

    /// Apply a signed delta to a user's balance and append it to the
    /// history, committing both together. Returns the new balance, which
    /// may be negative.
    pub fn add_points(&self, chat_id: i64, user_id: i64, delta: i64, reason: &str) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO user_points (chat_id, user_id, points) VALUES (?1, ?2, ?3)
                 ON CONFLICT(chat_id, user_id) DO UPDATE SET points = points + excluded.points",
                params![chat_id, user_id, delta],
            )?;
            let new_balance: i64 = tx.query_row(
                "SELECT points FROM user_points WHERE chat_id = ?1 AND user_id = ?2",
                params![chat_id, user_id],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO points_history (chat_id, user_id, points_change, reason, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![chat_id, user_id, delta, reason, now],
            )?;
            tx.commit()?;
            Ok(new_balance)
        })
    }

    /// Deduct points. Same as `add_points` with a negated delta; the
    /// balance is allowed to go below zero.
    pub fn subtract_points(
        &self,
        chat_id: i64,
        user_id: i64,
        amount: i64,
        reason: &str,
    ) -> Result<i64> {
        self.add_points(chat_id, user_id, -amount, reason)
    }

    /// Overwrite a user's balance. The history row records the signed
    /// difference from the previous balance, not the new value, so the
    /// sum of all history deltas still equals the balance.
    pub fn set_points(&self, chat_id: i64, user_id: i64, value: i64) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let old: i64 = tx
                .query_row(
                    "SELECT points FROM user_points WHERE chat_id = ?1 AND user_id = ?2",
                    params![chat_id, user_id],
                    |row| row.get(0),
                )
                .optional()?
                .unwrap_or(0);
            tx.execute(
                "INSERT INTO user_points (chat_id, user_id, points) VALUES (?1, ?2, ?3)
                 ON CONFLICT(chat_id, user_id) DO UPDATE SET points = excluded.points",
                params![chat_id, user_id, value],
            )?;
            tx.execute(
                "INSERT INTO points_history (chat_id, user_id, points_change, reason, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![chat_id, user_id, value - old, "admin adjustment", now],
            )?;
            tx.commit()?;
            Ok(value)
        })
    }

    /// 1-based position among users with a positive balance. Users whose
    /// balance is zero or negative have no rank.
    pub fn user_rank(&self, chat_id: i64, user_id: i64) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let points: Option<i64> = conn
                .query_row(
                    "SELECT points FROM user_points WHERE chat_id = ?1 AND user_id = ?2",
                    params![chat_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;
            let points = match points {
                Some(p) if p > 0 => p,
                _ => return Ok(None),
            };
            let ahead: i64 = conn.query_row(
                "SELECT COUNT(*) FROM user_points WHERE chat_id = ?1 AND points > ?2",
                params![chat_id, points],
                |row| row.get(0),
            )?;
            Ok(Some(ahead + 1))
        })
    }

    /// Top balances for a chat, highest first. Zero and negative balances
    /// are listed too if the limit reaches them.
    pub fn leaderboard(&self, chat_id: i64, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, points FROM user_points
                 WHERE chat_id = ?1 ORDER BY points DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![chat_id, limit as i64], |row| {
                    Ok(LeaderboardEntry {
                        user_id: row.get(0)?,
                        points: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Whether the earn cooldown has elapsed. Users with no row or no
    /// recorded earn time may always earn.
    pub fn can_earn(
        &self,
        chat_id: i64,
        user_id: i64,
        cooldown_seconds: i64,
        now: i64,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let last: Option<Option<i64>> = conn
                .query_row(
                    "SELECT last_message_time FROM user_points
                     WHERE chat_id = ?1 AND user_id = ?2",
                    params![chat_id, user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(match last {
                Some(Some(last)) => now - last >= cooldown_seconds,
                _ => true,
            })
        })
    }

    /// Stamp the moment a user last earned activity points. Only updates
    /// an existing ledger row; callers award points first, which creates
    /// the row.
    pub fn mark_earned(&self, chat_id: i64, user_id: i64, now: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE user_points SET last_message_time = ?3
                 WHERE chat_id = ?1 AND user_id = ?2",
                params![chat_id, user_id, now],
            )?;
            Ok(())
        })
    }

    /// Recent history rows for a user, newest first.
    pub fn points_history(
        &self,
        chat_id: i64,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<PointsEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT points_change, reason, timestamp FROM points_history
                 WHERE chat_id = ?1 AND user_id = ?2
                 ORDER BY timestamp DESC, id DESC LIMIT ?3",
            )?;
            let rows = stmt
                .query_map(params![chat_id, user_id, limit as i64], |row| {
                    Ok(PointsEntry {
                        change: row.get(0)?,
                        reason: row.get(1)?,
                        timestamp: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
