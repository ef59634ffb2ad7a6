// src/bot/mod.rs - Moderation engine wiring guards, ledger and remote actions

pub mod admin_cache;
pub mod ads;
pub mod duplicate;
pub mod flood;

use anyhow::Result;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::BotConfig;
use crate::platforms::ChatApi;
use crate::storage::Database;
use crate::types::{
    ChatEvent, ChatSettings, GuardError, LeaderboardEntry, MessageEvent, MessageVerdict,
    NewMemberEvent, PointsEntry, UserRef, Violation, WarnOutcome, Warning,
};

use admin_cache::AdminCache;
use ads::is_advertisement;
use duplicate::DuplicateGuard;
use flood::FloodGuard;

/// How long a flood notice stays in chat before being cleaned up.
const FLOOD_NOTICE_SECS: u64 = 5;

/// Welcome text used when a chat has not configured its own.
const DEFAULT_WELCOME: &str = "👋 Welcome {username} to {chat_title}!\n\n\
    💡 Please follow the group rules and keep it friendly.\n\
    💰 Chatting earns you reputation points.\n\n\
    Enjoy your stay! 🎉";

/// Central moderation engine.
///
/// Consumes chat events, runs each message through the guard pipeline
/// (bot check, admin check, flood, duplicate, ads, point earning) and
/// applies the outcome: deletions and notices through the platform
/// [`ChatApi`], balances and warnings through the database. Also exposes
/// the operator surface used by command frontends.
pub struct ModerationEngine {
    config: BotConfig,
    db: Arc<Database>,
    api: Arc<dyn ChatApi>,
    admin_cache: AdminCache,
    flood: FloodGuard,
    duplicate: DuplicateGuard,
}

impl ModerationEngine {
    pub fn new(config: BotConfig, db: Arc<Database>, api: Arc<dyn ChatApi>) -> Self {
        let admin_cache = AdminCache::new(config.admin_cache_ttl_seconds);
        let flood = FloodGuard::new(config.flood_limit, config.flood_window_seconds);
        let duplicate = DuplicateGuard::new(config.duplicate_history);
        Self {
            config,
            db,
            api,
            admin_cache,
            flood,
            duplicate,
        }
    }

    /// Consume events until the channel closes, processing each one on
    /// its own task so a slow platform call never blocks the intake.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<ChatEvent>) {
        info!("Moderation engine started");
        while let Some(event) = events.recv().await {
            let engine = Arc::clone(&self);
            tokio::spawn(async move {
                engine.handle_event(event).await;
            });
        }
        info!("Moderation engine stopped");
    }

    /// Dispatch a single event. Failures are logged, never raised: one
    /// bad event must not take the intake loop down.
    pub async fn handle_event(&self, event: ChatEvent) {
        let result = match event {
            ChatEvent::Message(msg) => self.handle_message(&msg).await.map(|_| ()),
            ChatEvent::NewMembers(ev) => self.handle_new_members(&ev).await,
        };
        if let Err(e) = result {
            error!("Failed to process chat event: {:#}", e);
        }
    }

    // ========== Message pipeline ==========

    /// Run one message through the moderation pipeline. At most one
    /// guard fires per message; a removed message never earns points.
    pub async fn handle_message(&self, msg: &MessageEvent) -> Result<MessageVerdict> {
        let chat_id = msg.chat_id;
        let user_id = msg.from.user_id;
        let now = msg.timestamp.timestamp();

        if msg.from.is_bot {
            return Ok(MessageVerdict::SkippedBot);
        }
        if self
            .admin_cache
            .is_admin(self.api.as_ref(), chat_id, user_id, now)
            .await
        {
            return Ok(MessageVerdict::SkippedAdmin);
        }

        if self.flood.record(chat_id, user_id, now).await {
            return self.remove_flood(msg).await;
        }

        if self.duplicate.check(chat_id, user_id, msg.content()).await {
            return self.remove_duplicate(msg).await;
        }

        if self.ads_enabled(chat_id)? && is_advertisement(msg.content()) {
            return self.remove_advertisement(msg).await;
        }

        if self.config.points_enabled
            && self
                .db
                .can_earn(chat_id, user_id, self.config.earn_cooldown_seconds, now)?
        {
            let amount = self.config.points_per_message;
            let new_balance = self.db.add_points(chat_id, user_id, amount, "chat activity")?;
            self.db.mark_earned(chat_id, user_id, now)?;
            debug!(
                "User {} earned {} points in chat {} (balance {})",
                user_id, amount, chat_id, new_balance
            );
            return Ok(MessageVerdict::Earned {
                amount,
                new_balance,
            });
        }

        Ok(MessageVerdict::Accepted)
    }

    async fn remove_flood(&self, msg: &MessageEvent) -> Result<MessageVerdict> {
        self.delete_silently(msg.chat_id, msg.message_id, "flooding message")
            .await;

        let notice = format!(
            "⚠️ {}, please slow down! Message removed.",
            msg.from.display_name()
        );
        match self.api.send_message(msg.chat_id, &notice).await {
            Ok(notice_id) => {
                let api = Arc::clone(&self.api);
                let chat_id = msg.chat_id;
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(FLOOD_NOTICE_SECS)).await;
                    if let Err(e) = api.delete_message(chat_id, notice_id).await {
                        debug!("Could not remove flood notice in chat {}: {}", chat_id, e);
                    }
                });
            }
            Err(e) => warn!("Could not send flood notice in chat {}: {}", msg.chat_id, e),
        }

        let penalty = self.config.flood_penalty;
        self.db
            .subtract_points(msg.chat_id, msg.from.user_id, penalty, "flooding")?;
        info!(
            "Removed flooding message {} from user {} in chat {}",
            msg.message_id, msg.from.user_id, msg.chat_id
        );
        Ok(MessageVerdict::Removed {
            violation: Violation::Flood,
            penalty,
        })
    }

    async fn remove_duplicate(&self, msg: &MessageEvent) -> Result<MessageVerdict> {
        self.delete_silently(msg.chat_id, msg.message_id, "duplicate message")
            .await;

        let penalty = self.config.duplicate_penalty;
        self.db
            .subtract_points(msg.chat_id, msg.from.user_id, penalty, "duplicate message")?;
        info!(
            "Removed duplicate message {} from user {} in chat {}",
            msg.message_id, msg.from.user_id, msg.chat_id
        );
        Ok(MessageVerdict::Removed {
            violation: Violation::Duplicate,
            penalty,
        })
    }

    /// Ads cost at most the user's current balance: the penalty never
    /// pushes anyone negative, and users at or below zero lose nothing.
    async fn remove_advertisement(&self, msg: &MessageEvent) -> Result<MessageVerdict> {
        self.delete_silently(msg.chat_id, msg.message_id, "advertisement")
            .await;

        let current = self.db.balance(msg.chat_id, msg.from.user_id)?;
        let penalty = if current > 0 {
            self.config.ad_penalty.min(current)
        } else {
            0
        };
        if penalty > 0 {
            self.db
                .subtract_points(msg.chat_id, msg.from.user_id, penalty, "advertising")?;
        }
        info!(
            "Removed advertisement {} from user {} in chat {}",
            msg.message_id, msg.from.user_id, msg.chat_id
        );
        Ok(MessageVerdict::Removed {
            violation: Violation::Advertisement,
            penalty,
        })
    }

    fn ads_enabled(&self, chat_id: i64) -> Result<bool> {
        if !self.config.auto_delete_ads {
            return Ok(false);
        }
        Ok(self.db.chat_settings(chat_id)?.auto_delete_ads)
    }

    async fn delete_silently(&self, chat_id: i64, message_id: i64, what: &str) {
        if let Err(e) = self.api.delete_message(chat_id, message_id).await {
            warn!(
                "Could not delete {} {} in chat {}: {}",
                what, message_id, chat_id, e
            );
        }
    }

    // ========== New members ==========

    /// Handle a join update: kick bots where configured, welcome humans
    /// and award the join bonus. Never runs the message guards.
    pub async fn handle_new_members(&self, event: &NewMemberEvent) -> Result<()> {
        let settings = self.db.chat_settings(event.chat_id)?;
        for member in &event.members {
            if member.is_bot {
                if self.config.auto_kick_bots || settings.auto_kick_bots {
                    self.kick_bot(event.chat_id, member).await;
                }
                continue;
            }
            if self.config.auto_welcome && settings.welcome_new_members {
                self.welcome_member(event, &settings, member).await?;
            }
        }
        Ok(())
    }

    async fn kick_bot(&self, chat_id: i64, bot: &UserRef) {
        match self.api.ban_member(chat_id, bot.user_id).await {
            Ok(()) => {
                let notice = format!("🤖 Removed bot: {}", bot.display_name());
                if let Err(e) = self.api.send_message(chat_id, &notice).await {
                    debug!("Could not announce bot removal in chat {}: {}", chat_id, e);
                }
                info!("Kicked joining bot {} from chat {}", bot.user_id, chat_id);
            }
            Err(e) => error!(
                "Could not kick bot {} from chat {}: {}",
                bot.user_id, chat_id, e
            ),
        }
    }

    async fn welcome_member(
        &self,
        event: &NewMemberEvent,
        settings: &ChatSettings,
        member: &UserRef,
    ) -> Result<()> {
        let template = settings.welcome_message.as_deref().unwrap_or(DEFAULT_WELCOME);
        let text = render_welcome(template, member, event.chat_title.as_deref());
        if let Err(e) = self.api.send_message(event.chat_id, &text).await {
            warn!(
                "Could not send welcome for user {} in chat {}: {}",
                member.user_id, event.chat_id, e
            );
        }
        if self.config.points_enabled {
            self.db.add_points(
                event.chat_id,
                member.user_id,
                self.config.new_member_bonus,
                "new member bonus",
            )?;
        }
        info!(
            "Welcomed new member {} in chat {}",
            member.user_id, event.chat_id
        );
        Ok(())
    }

    // ========== Operator commands ==========

    /// Record a warning. Reaching the warning limit escalates to a ban;
    /// the recorded count stands even if the ban is refused remotely.
    pub async fn warn_user(
        &self,
        chat_id: i64,
        user_id: i64,
        admin_id: i64,
        reason: Option<&str>,
    ) -> Result<WarnOutcome> {
        let count = self.db.add_warning(chat_id, user_id, admin_id, reason)?;
        let limit = self.config.max_warnings;
        let mut banned = false;
        if count >= limit as i64 {
            match self.api.ban_member(chat_id, user_id).await {
                Ok(()) => {
                    banned = true;
                    info!(
                        "User {} banned from chat {} after {} warnings",
                        user_id, chat_id, count
                    );
                }
                Err(e) => error!(
                    "Could not ban user {} in chat {} after {} warnings: {}",
                    user_id, chat_id, count, e
                ),
            }
        }
        Ok(WarnOutcome {
            count,
            limit,
            banned,
        })
    }

    /// Drop every warning for a user, returning how many were removed.
    pub async fn clear_warnings(&self, chat_id: i64, user_id: i64) -> Result<usize> {
        let removed = self.db.clear_warnings(chat_id, user_id)?;
        info!(
            "Cleared {} warnings for user {} in chat {}",
            removed, user_id, chat_id
        );
        Ok(removed)
    }

    /// A user's warnings, newest first.
    pub async fn warnings(&self, chat_id: i64, user_id: i64) -> Result<Vec<Warning>> {
        self.db.warnings(chat_id, user_id)
    }

    pub async fn warning_count(&self, chat_id: i64, user_id: i64) -> Result<i64> {
        self.db.warning_count(chat_id, user_id)
    }

    pub async fn ban_user(&self, chat_id: i64, user_id: i64) -> Result<()> {
        self.api.ban_member(chat_id, user_id).await?;
        info!("Banned user {} from chat {}", user_id, chat_id);
        Ok(())
    }

    pub async fn unban_user(&self, chat_id: i64, user_id: i64) -> Result<()> {
        self.api.unban_member(chat_id, user_id).await?;
        info!("Unbanned user {} in chat {}", user_id, chat_id);
        Ok(())
    }

    /// Mute a user. `None` applies the configured default duration; any
    /// requested duration is capped at the configured maximum, and zero
    /// (or below) mutes with no expiry.
    pub async fn mute_user(
        &self,
        chat_id: i64,
        user_id: i64,
        duration_seconds: Option<i64>,
    ) -> Result<()> {
        let requested = duration_seconds.unwrap_or(self.config.default_ban_seconds);
        let duration = requested.min(self.config.max_mute_seconds);
        let until = if duration <= 0 {
            0
        } else {
            Utc::now().timestamp() + duration
        };
        self.api
            .restrict_member(chat_id, user_id, false, until)
            .await?;
        info!(
            "Muted user {} in chat {} ({})",
            user_id,
            chat_id,
            if until == 0 {
                "permanently".to_string()
            } else {
                format!("{}s", duration)
            }
        );
        Ok(())
    }

    pub async fn unmute_user(&self, chat_id: i64, user_id: i64) -> Result<()> {
        self.api.restrict_member(chat_id, user_id, true, 0).await?;
        info!("Unmuted user {} in chat {}", user_id, chat_id);
        Ok(())
    }

    /// Grant points to a user. The amount must be positive; granting
    /// does not touch the earn cooldown.
    pub async fn grant_points(
        &self,
        chat_id: i64,
        user_id: i64,
        amount: i64,
        reason: &str,
    ) -> Result<i64> {
        if amount <= 0 {
            return Err(GuardError::InvalidAmount(amount).into());
        }
        let new_balance = self.db.add_points(chat_id, user_id, amount, reason)?;
        info!(
            "Granted {} points to user {} in chat {} (balance {})",
            amount, user_id, chat_id, new_balance
        );
        Ok(new_balance)
    }

    /// Take points from a user, clamping the result at zero.
    pub async fn revoke_points(
        &self,
        chat_id: i64,
        user_id: i64,
        amount: i64,
        reason: &str,
    ) -> Result<i64> {
        if amount <= 0 {
            return Err(GuardError::InvalidAmount(amount).into());
        }
        let new_balance = self.db.subtract_points(chat_id, user_id, amount, reason)?;
        if new_balance < 0 {
            self.db.set_points(chat_id, user_id, 0)?;
            info!(
                "Revoked {} points from user {} in chat {} (clamped to 0)",
                amount, user_id, chat_id
            );
            return Ok(0);
        }
        info!(
            "Revoked {} points from user {} in chat {} (balance {})",
            amount, user_id, chat_id, new_balance
        );
        Ok(new_balance)
    }

    /// Overwrite a user's balance. Negative values are rejected.
    pub async fn set_user_points(&self, chat_id: i64, user_id: i64, value: i64) -> Result<i64> {
        if value < 0 {
            return Err(GuardError::NegativeValue(value).into());
        }
        let new_balance = self.db.set_points(chat_id, user_id, value)?;
        info!(
            "Set points of user {} in chat {} to {}",
            user_id, chat_id, new_balance
        );
        Ok(new_balance)
    }

    pub async fn user_balance(&self, chat_id: i64, user_id: i64) -> Result<i64> {
        self.db.balance(chat_id, user_id)
    }

    pub async fn user_rank(&self, chat_id: i64, user_id: i64) -> Result<Option<i64>> {
        self.db.user_rank(chat_id, user_id)
    }

    pub async fn leaderboard(&self, chat_id: i64, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        self.db.leaderboard(chat_id, limit)
    }

    pub async fn points_history(
        &self,
        chat_id: i64,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<PointsEntry>> {
        self.db.points_history(chat_id, user_id, limit)
    }

    pub async fn chat_settings(&self, chat_id: i64) -> Result<ChatSettings> {
        self.db.chat_settings(chat_id)
    }

    pub async fn update_chat_setting(&self, chat_id: i64, key: &str, value: &str) -> Result<()> {
        self.db.update_setting(chat_id, key, value)?;
        info!("Updated setting {} for chat {}", key, chat_id);
        Ok(())
    }

    /// Evict cached admin answers, e.g. after a promotion or demotion.
    pub async fn invalidate_admin_cache(&self, chat_id: Option<i64>, user_id: Option<i64>) {
        self.admin_cache.invalidate(chat_id, user_id).await;
    }
}

/// Substitute `{username}`, `{first_name}` and `{chat_title}` into a
/// welcome template.
fn render_welcome(template: &str, member: &UserRef, chat_title: Option<&str>) -> String {
    let first_name = if member.first_name.is_empty() {
        "new member"
    } else {
        member.first_name.as_str()
    };
    template
        .replace("{username}", member.display_name())
        .replace("{first_name}", first_name)
        .replace("{chat_title}", chat_title.unwrap_or("this group"))
}
