// src/platforms/mod.rs - Transport-facing trait the engine drives

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Membership status of a user within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Creators and administrators bypass moderation entirely.
    pub fn is_privileged(&self) -> bool {
        matches!(self, MemberStatus::Creator | MemberStatus::Administrator)
    }
}

/// Remote chat operations the engine needs from a platform client.
///
/// The engine never talks to a network itself; embedders supply an
/// implementation backed by their transport of choice. Tests use a
/// recording mock.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Delete a message from a chat.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()>;

    /// Send a text message, returning the new message's id.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64>;

    /// Ban a user from a chat.
    async fn ban_member(&self, chat_id: i64, user_id: i64) -> Result<()>;

    /// Lift a ban.
    async fn unban_member(&self, chat_id: i64, user_id: i64) -> Result<()>;

    /// Toggle a user's ability to send messages. `until` is a unix
    /// timestamp; 0 means no expiry.
    async fn restrict_member(
        &self,
        chat_id: i64,
        user_id: i64,
        can_send: bool,
        until: i64,
    ) -> Result<()>;

    /// Look up a user's membership status in a chat.
    async fn member_status(&self, chat_id: i64, user_id: i64) -> Result<MemberStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_covers_creator_and_admin_only() {
        assert!(MemberStatus::Creator.is_privileged());
        assert!(MemberStatus::Administrator.is_privileged());
        assert!(!MemberStatus::Member.is_privileged());
        assert!(!MemberStatus::Restricted.is_privileged());
        assert!(!MemberStatus::Left.is_privileged());
        assert!(!MemberStatus::Kicked.is_privileged());
    }
}
