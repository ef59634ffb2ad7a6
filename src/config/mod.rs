// src/config/mod.rs - Engine configuration with environment overrides

use log::warn;
use serde::{Deserialize, Serialize};

/// Tunable parameters for the moderation engine.
///
/// `Default` carries the stock values; `from_env` layers environment
/// overrides on top. Unparsable environment values are ignored with a
/// warning rather than aborting startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Warnings before a user is automatically banned.
    pub max_warnings: u32,
    /// Points earned per qualifying message.
    pub points_per_message: i64,
    /// Minimum seconds between point-earning messages.
    pub earn_cooldown_seconds: i64,
    /// Points granted to a newly joined member.
    pub new_member_bonus: i64,
    /// Points deducted for an advertisement (capped at the user's balance).
    pub ad_penalty: i64,
    /// Points deducted for flooding.
    pub flood_penalty: i64,
    /// Points deducted for a duplicate message.
    pub duplicate_penalty: i64,
    /// Messages within the flood window that count as flooding.
    pub flood_limit: usize,
    /// Flood detection window in seconds.
    pub flood_window_seconds: i64,
    /// How many recent messages are kept for duplicate detection.
    pub duplicate_history: usize,
    /// How long an admin-status lookup stays cached, in seconds.
    pub admin_cache_ttl_seconds: i64,
    /// Default ban duration in seconds.
    pub default_ban_seconds: i64,
    /// Upper bound for mute durations, in seconds.
    pub max_mute_seconds: i64,
    /// Global switch for ad removal (combined with the per-chat setting).
    pub auto_delete_ads: bool,
    /// Global switch for welcome messages (combined with the per-chat setting).
    pub auto_welcome: bool,
    /// Global switch for kicking joining bots.
    pub auto_kick_bots: bool,
    /// Global switch for the points system.
    pub points_enabled: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_warnings: 3,
            points_per_message: 1,
            earn_cooldown_seconds: 60,
            new_member_bonus: 10,
            ad_penalty: 10,
            flood_penalty: 5,
            duplicate_penalty: 2,
            flood_limit: 5,
            flood_window_seconds: 10,
            duplicate_history: 5,
            admin_cache_ttl_seconds: 300,
            default_ban_seconds: 86400,
            max_mute_seconds: 2592000,
            auto_delete_ads: true,
            auto_welcome: true,
            auto_kick_bots: false,
            points_enabled: true,
        }
    }
}

impl BotConfig {
    /// Build a config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_warnings: env_u32("MAX_WARN_LIMIT", defaults.max_warnings),
            points_per_message: env_i64("POINTS_PER_MESSAGE", defaults.points_per_message),
            earn_cooldown_seconds: env_i64("POINTS_COOLDOWN", defaults.earn_cooldown_seconds),
            new_member_bonus: env_i64("NEW_MEMBER_BONUS", defaults.new_member_bonus),
            ad_penalty: env_i64("AD_POINTS_PENALTY", defaults.ad_penalty),
            flood_penalty: env_i64("FLOOD_POINTS_PENALTY", defaults.flood_penalty),
            duplicate_penalty: env_i64("DUPLICATE_POINTS_PENALTY", defaults.duplicate_penalty),
            flood_limit: env_usize("FLOOD_LIMIT", defaults.flood_limit),
            flood_window_seconds: env_i64("FLOOD_WINDOW", defaults.flood_window_seconds),
            duplicate_history: env_usize("DUPLICATE_CHECK_COUNT", defaults.duplicate_history),
            admin_cache_ttl_seconds: env_i64("ADMIN_CACHE_TIMEOUT", defaults.admin_cache_ttl_seconds),
            default_ban_seconds: env_i64("DEFAULT_BAN_TIME", defaults.default_ban_seconds),
            max_mute_seconds: env_i64("MAX_MUTE_TIME", defaults.max_mute_seconds),
            auto_delete_ads: env_bool("AUTO_DELETE_ADS", defaults.auto_delete_ads),
            auto_welcome: env_bool("AUTO_WELCOME", defaults.auto_welcome),
            auto_kick_bots: env_bool("AUTO_KICK_BOTS", defaults.auto_kick_bots),
            points_enabled: env_bool("ENABLE_POINTS_SYSTEM", defaults.points_enabled),
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable {}={:?}, using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable {}={:?}, using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable {}={:?}, using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                warn!("Ignoring unparsable {}={:?}, using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_values() {
        let config = BotConfig::default();
        assert_eq!(config.max_warnings, 3);
        assert_eq!(config.flood_limit, 5);
        assert_eq!(config.flood_window_seconds, 10);
        assert_eq!(config.duplicate_history, 5);
        assert_eq!(config.admin_cache_ttl_seconds, 300);
        assert_eq!(config.max_mute_seconds, 2592000);
        assert!(config.auto_delete_ads);
        assert!(config.auto_welcome);
        assert!(!config.auto_kick_bots);
        assert!(config.points_enabled);
    }

    #[test]
    fn env_i64_ignores_garbage() {
        std::env::set_var("GROUPGUARD_TEST_I64", "not a number");
        assert_eq!(env_i64("GROUPGUARD_TEST_I64", 42), 42);
        std::env::set_var("GROUPGUARD_TEST_I64", "17");
        assert_eq!(env_i64("GROUPGUARD_TEST_I64", 42), 17);
        std::env::remove_var("GROUPGUARD_TEST_I64");
        assert_eq!(env_i64("GROUPGUARD_TEST_I64", 42), 42);
    }

    #[test]
    fn env_bool_accepts_common_spellings() {
        for truthy in ["true", "1", "yes", "on", "TRUE", "Yes"] {
            std::env::set_var("GROUPGUARD_TEST_BOOL", truthy);
            assert!(env_bool("GROUPGUARD_TEST_BOOL", false), "{}", truthy);
        }
        for falsy in ["false", "0", "no", "off", "OFF"] {
            std::env::set_var("GROUPGUARD_TEST_BOOL", falsy);
            assert!(!env_bool("GROUPGUARD_TEST_BOOL", true), "{}", falsy);
        }
        std::env::set_var("GROUPGUARD_TEST_BOOL", "banana");
        assert!(env_bool("GROUPGUARD_TEST_BOOL", true));
        assert!(!env_bool("GROUPGUARD_TEST_BOOL", false));
        std::env::remove_var("GROUPGUARD_TEST_BOOL");
    }

    #[test]
    fn from_env_overrides_defaults() {
        std::env::set_var("MAX_WARN_LIMIT", "5");
        std::env::set_var("FLOOD_LIMIT", "8");
        std::env::set_var("AUTO_KICK_BOTS", "yes");
        let config = BotConfig::from_env();
        assert_eq!(config.max_warnings, 5);
        assert_eq!(config.flood_limit, 8);
        assert!(config.auto_kick_bots);
        // Untouched fields keep their defaults
        assert_eq!(config.points_per_message, 1);
        std::env::remove_var("MAX_WARN_LIMIT");
        std::env::remove_var("FLOOD_LIMIT");
        std::env::remove_var("AUTO_KICK_BOTS");
    }
}
