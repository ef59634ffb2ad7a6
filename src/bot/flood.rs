// src/bot/flood.rs - Sliding-window flood detection

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Send times remembered per user. Fixed regardless of the configured
/// flood limit, so bursts are judged against the whole retained window.
const WINDOW_CAPACITY: usize = 10;

/// Detects message flooding with a per-user sliding window of send times.
///
/// State is ephemeral and per (chat, user); restarting the engine clears
/// all windows.
pub struct FloodGuard {
    windows: Arc<RwLock<HashMap<(i64, i64), VecDeque<i64>>>>,
    limit: usize,
    window_seconds: i64,
}

impl FloodGuard {
    pub fn new(limit: usize, window_seconds: i64) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            limit,
            window_seconds,
        }
    }

    /// Record a message sent at `now` (unix seconds) and report whether it
    /// completes a flood: at least `limit` retained timestamps whose span
    /// is shorter than the window. The timestamp is recorded first, so a
    /// flooding message is itself part of the window that condemns it.
    pub async fn record(&self, chat_id: i64, user_id: i64, now: i64) -> bool {
        let mut windows = self.windows.write().await;
        let window = windows.entry((chat_id, user_id)).or_default();

        window.push_back(now);
        while window.len() > WINDOW_CAPACITY {
            window.pop_front();
        }

        if window.len() < self.limit {
            return false;
        }
        match (window.front(), window.back()) {
            (Some(first), Some(last)) => last - first < self.window_seconds,
            _ => false,
        }
    }
}
