// src/bot/duplicate.rs - Recent-message duplicate suppression

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Texts shorter than this (in characters, not bytes) are too common to
/// judge and are never tracked.
const MIN_TEXT_CHARS: usize = 10;

/// Flags exact repeats of a user's own recent messages.
pub struct DuplicateGuard {
    history: Arc<RwLock<HashMap<(i64, i64), VecDeque<String>>>>,
    capacity: usize,
}

impl DuplicateGuard {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Check a message against the user's recent history. Returns true on
    /// an exact repeat of a retained text. Short texts leave the history
    /// untouched; a flagged repeat is not re-recorded, so the original
    /// entry ages out on its own schedule.
    pub async fn check(&self, chat_id: i64, user_id: i64, text: &str) -> bool {
        let text = text.trim();
        if text.chars().count() < MIN_TEXT_CHARS {
            return false;
        }

        let mut history = self.history.write().await;
        let recent = history.entry((chat_id, user_id)).or_default();

        if recent.iter().any(|seen| seen == text) {
            return true;
        }
        recent.push_back(text.to_string());
        while recent.len() > self.capacity {
            recent.pop_front();
        }
        false
    }
}
