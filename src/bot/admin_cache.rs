// src/bot/admin_cache.rs - TTL cache over member-status lookups

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::RwLock;

use crate::platforms::ChatApi;

/// Caches "is this user privileged in this chat" answers so the hot
/// message path does not hit the platform on every message.
///
/// Answers stay fresh for the configured TTL. Failed lookups resolve to
/// "not an admin" but are never cached, so a transient outage cannot
/// pin a wrong answer.
pub struct AdminCache {
    entries: Arc<RwLock<HashMap<(i64, i64), (bool, i64)>>>,
    ttl_seconds: i64,
}

impl AdminCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_seconds,
        }
    }

    /// Cached admin check at time `now` (unix seconds).
    pub async fn is_admin(&self, api: &dyn ChatApi, chat_id: i64, user_id: i64, now: i64) -> bool {
        {
            let entries = self.entries.read().await;
            if let Some(&(is_admin, cached_at)) = entries.get(&(chat_id, user_id)) {
                if now - cached_at < self.ttl_seconds {
                    return is_admin;
                }
            }
        }

        match api.member_status(chat_id, user_id).await {
            Ok(status) => {
                let is_admin = status.is_privileged();
                self.entries
                    .write()
                    .await
                    .insert((chat_id, user_id), (is_admin, now));
                is_admin
            }
            Err(e) => {
                warn!(
                    "Admin lookup failed for user {} in chat {}: {}",
                    user_id, chat_id, e
                );
                false
            }
        }
    }

    /// Evict cached answers. `None` acts as a wildcard on that side: one
    /// user in one chat, everything for a chat, one user across all
    /// chats, or the whole cache.
    pub async fn invalidate(&self, chat_id: Option<i64>, user_id: Option<i64>) {
        let mut entries = self.entries.write().await;
        if chat_id.is_none() && user_id.is_none() {
            entries.clear();
        } else {
            entries.retain(|&(cid, uid), _| {
                !(chat_id.map_or(true, |c| cid == c) && user_id.map_or(true, |u| uid == u))
            });
        }
        debug!(
            "Admin cache invalidated (chat={:?}, user={:?})",
            chat_id, user_id
        );
    }
}
