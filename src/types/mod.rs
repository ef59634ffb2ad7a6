// src/types/mod.rs - Core event and outcome types shared across the engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A chat participant as seen on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub is_bot: bool,
}

impl UserRef {
    /// Name used when addressing the user in chat notices.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

/// An inbound group message to be moderated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub chat_id: i64,
    pub message_id: i64,
    pub from: UserRef,
    pub text: Option<String>,
    /// Media caption, used when `text` is absent.
    pub caption: Option<String>,
    pub chat_title: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl MessageEvent {
    /// Message text, falling back to the media caption.
    pub fn content(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }
}

/// One or more users joining a chat in a single update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMemberEvent {
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub members: Vec<UserRef>,
}

/// Events consumed by the moderation engine's intake loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatEvent {
    Message(MessageEvent),
    NewMembers(NewMemberEvent),
}

/// Why a message was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    Flood,
    Duplicate,
    Advertisement,
}

/// Outcome of running one message through the moderation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageVerdict {
    /// Sender is a bot, nothing was checked.
    SkippedBot,
    /// Sender is a chat owner or administrator, nothing was checked.
    SkippedAdmin,
    /// A guard fired: the message was removed and `penalty` points deducted.
    Removed { violation: Violation, penalty: i64 },
    /// Clean message that earned activity points.
    Earned { amount: i64, new_balance: i64 },
    /// Clean message, no points awarded (cooldown or points disabled).
    Accepted,
}

/// Result of an operator-issued warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarnOutcome {
    /// Warning count after this warning was recorded.
    pub count: i64,
    /// Threshold at which the engine escalates to a ban.
    pub limit: u32,
    /// Whether the escalation ban was actually applied.
    pub banned: bool,
}

/// A recorded warning against a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub admin_id: i64,
    pub reason: Option<String>,
    pub timestamp: i64,
}

/// One row of a user's points history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsEntry {
    pub change: i64,
    pub reason: Option<String>,
    pub timestamp: i64,
}

/// A leaderboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub points: i64,
}

/// Per-chat moderation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub chat_id: i64,
    pub welcome_message: Option<String>,
    pub rules: Option<String>,
    pub auto_delete_ads: bool,
    pub welcome_new_members: bool,
    pub auto_kick_bots: bool,
}

impl ChatSettings {
    /// Settings used for a chat that has never been configured.
    pub fn defaults(chat_id: i64) -> Self {
        Self {
            chat_id,
            welcome_message: None,
            rules: None,
            auto_delete_ads: true,
            welcome_new_members: true,
            auto_kick_bots: false,
        }
    }
}

/// Errors caused by invalid operator input, as opposed to internal failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("unknown setting '{0}'")]
    UnknownSetting(String),
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidSettingValue { key: String, value: String },
    #[error("point amount must be positive, got {0}")]
    InvalidAmount(i64),
    #[error("points value must not be negative, got {0}")]
    NegativeValue(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_username() {
        let user = UserRef {
            user_id: 1,
            username: Some("alice".to_string()),
            first_name: "Alice".to_string(),
            is_bot: false,
        };
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn display_name_falls_back_to_first_name() {
        let user = UserRef {
            user_id: 1,
            username: None,
            first_name: "Alice".to_string(),
            is_bot: false,
        };
        assert_eq!(user.display_name(), "Alice");
    }

    #[test]
    fn content_falls_back_to_caption() {
        let msg = MessageEvent {
            chat_id: -100,
            message_id: 1,
            from: UserRef {
                user_id: 1,
                username: None,
                first_name: "Alice".to_string(),
                is_bot: false,
            },
            text: None,
            caption: Some("check this out".to_string()),
            chat_title: None,
            timestamp: chrono::Utc::now(),
        };
        assert_eq!(msg.content(), "check this out");

        let empty = MessageEvent {
            text: None,
            caption: None,
            ..msg
        };
        assert_eq!(empty.content(), "");
    }

    #[test]
    fn events_parse_from_wire_json() {
        let payload = r#"{
            "Message": {
                "chat_id": -1001,
                "message_id": 77,
                "from": {
                    "user_id": 42,
                    "username": "alice",
                    "first_name": "Alice",
                    "is_bot": false
                },
                "text": "hello there",
                "caption": null,
                "chat_title": "Rust Hangout",
                "timestamp": "2026-08-24T12:00:00Z"
            }
        }"#;

        let event: ChatEvent = serde_json::from_str(payload).unwrap();
        match event {
            ChatEvent::Message(msg) => {
                assert_eq!(msg.chat_id, -1001);
                assert_eq!(msg.message_id, 77);
                assert_eq!(msg.from.display_name(), "alice");
                assert_eq!(msg.content(), "hello there");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn chat_settings_defaults() {
        let settings = ChatSettings::defaults(-100);
        assert!(settings.auto_delete_ads);
        assert!(settings.welcome_new_members);
        assert!(!settings.auto_kick_bots);
        assert!(settings.welcome_message.is_none());
    }
}
