// src/storage/settings.rs - Per-chat settings with validated updates

use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{params, OptionalExtension};

use crate::types::{ChatSettings, GuardError};

use super::Database;

/// Settings fields that may be updated by name.
const TEXT_KEYS: &[&str] = &["welcome_message", "rules"];
const FLAG_KEYS: &[&str] = &["auto_delete_ads", "welcome_new_members", "auto_kick_bots"];

impl Database {
    /// Settings for a chat, falling back to defaults for chats that were
    /// never configured.
    pub fn chat_settings(&self, chat_id: i64) -> Result<ChatSettings> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT welcome_message, rules, auto_delete_ads,
                            welcome_new_members, auto_kick_bots
                     FROM chat_settings WHERE chat_id = ?1",
                    params![chat_id],
                    |row| {
                        Ok(ChatSettings {
                            chat_id,
                            welcome_message: row.get(0)?,
                            rules: row.get(1)?,
                            auto_delete_ads: row.get::<_, i64>(2)? != 0,
                            welcome_new_members: row.get::<_, i64>(3)? != 0,
                            auto_kick_bots: row.get::<_, i64>(4)? != 0,
                        })
                    },
                )
                .optional()?;
            Ok(row.unwrap_or_else(|| ChatSettings::defaults(chat_id)))
        })
    }

    /// Update a single settings field by name. Unknown keys and malformed
    /// boolean values are rejected; other fields of the row are left
    /// untouched.
    pub fn update_setting(&self, chat_id: i64, key: &str, value: &str) -> Result<()> {
        let stored: Value = if TEXT_KEYS.contains(&key) {
            Value::Text(value.to_string())
        } else if FLAG_KEYS.contains(&key) {
            Value::Integer(parse_flag(key, value)?)
        } else {
            return Err(GuardError::UnknownSetting(key.to_string()).into());
        };

        let now = chrono::Utc::now().timestamp();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT chat_id FROM chat_settings WHERE chat_id = ?1",
                    params![chat_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_some() {
                // Key is whitelisted above, safe to splice into the SQL.
                tx.execute(
                    &format!(
                        "UPDATE chat_settings SET {} = ?1, updated_at = ?2 WHERE chat_id = ?3",
                        key
                    ),
                    params![stored, now, chat_id],
                )?;
            } else {
                tx.execute(
                    &format!(
                        "INSERT INTO chat_settings (chat_id, {}, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?3)",
                        key
                    ),
                    params![chat_id, stored, now],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}

fn parse_flag(key: &str, value: &str) -> Result<i64> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(1),
        "false" | "0" | "no" | "off" => Ok(0),
        _ => Err(GuardError::InvalidSettingValue {
            key: key.to_string(),
            value: value.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: i64 = -1001;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn unconfigured_chat_gets_defaults() {
        let db = db();
        let settings = db.chat_settings(CHAT).unwrap();
        assert_eq!(settings, ChatSettings::defaults(CHAT));
    }

    #[test]
    fn text_fields_round_trip() {
        let db = db();
        db.update_setting(CHAT, "welcome_message", "Hi {first_name}!")
            .unwrap();
        db.update_setting(CHAT, "rules", "Be kind.").unwrap();

        let settings = db.chat_settings(CHAT).unwrap();
        assert_eq!(settings.welcome_message.as_deref(), Some("Hi {first_name}!"));
        assert_eq!(settings.rules.as_deref(), Some("Be kind."));
        // Untouched flags keep their defaults.
        assert!(settings.auto_delete_ads);
        assert!(!settings.auto_kick_bots);
    }

    #[test]
    fn flags_accept_boolish_spellings() {
        let db = db();
        db.update_setting(CHAT, "auto_delete_ads", "off").unwrap();
        db.update_setting(CHAT, "auto_kick_bots", "YES").unwrap();
        db.update_setting(CHAT, "welcome_new_members", "0").unwrap();

        let settings = db.chat_settings(CHAT).unwrap();
        assert!(!settings.auto_delete_ads);
        assert!(settings.auto_kick_bots);
        assert!(!settings.welcome_new_members);
    }

    #[test]
    fn later_updates_preserve_earlier_fields() {
        let db = db();
        db.update_setting(CHAT, "auto_kick_bots", "on").unwrap();
        db.update_setting(CHAT, "welcome_message", "hello").unwrap();

        let settings = db.chat_settings(CHAT).unwrap();
        assert!(settings.auto_kick_bots);
        assert_eq!(settings.welcome_message.as_deref(), Some("hello"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let db = db();
        let err = db.update_setting(CHAT, "spam_threshold", "3").unwrap_err();
        assert_eq!(
            err.downcast_ref::<GuardError>(),
            Some(&GuardError::UnknownSetting("spam_threshold".to_string()))
        );
        // Nothing was written.
        assert_eq!(db.chat_settings(CHAT).unwrap(), ChatSettings::defaults(CHAT));
    }

    #[test]
    fn malformed_flag_value_is_rejected() {
        let db = db();
        let err = db
            .update_setting(CHAT, "auto_delete_ads", "banana")
            .unwrap_err();
        match err.downcast_ref::<GuardError>() {
            Some(GuardError::InvalidSettingValue { key, value }) => {
                assert_eq!(key, "auto_delete_ads");
                assert_eq!(value, "banana");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn settings_are_scoped_per_chat() {
        let db = db();
        db.update_setting(-1, "auto_delete_ads", "off").unwrap();
        assert!(!db.chat_settings(-1).unwrap().auto_delete_ads);
        assert!(db.chat_settings(-2).unwrap().auto_delete_ads);
    }
}
