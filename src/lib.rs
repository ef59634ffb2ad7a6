//! # Group Chat Moderation Engine
//!
//! A real-time moderation engine for group chats, combining spam guards
//! with a reputation points system backed by SQLite.
//!
//! ## Features
//!
//! - **Flood Control**: Sliding-window rate detection with automatic message removal
//! - **Duplicate Detection**: Per-user recent-message tracking with exact-match repeat detection
//! - **Ad Filtering**: Invite-link and keyword heuristics with balance-capped penalties
//! - **Reputation Points**: Earned per message, with history, ranks and leaderboards
//! - **Warnings & Escalation**: Configurable warning limit with automatic bans
//! - **Platform Agnostic**: One [`ChatApi`](platforms::ChatApi) trait to implement per platform
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use groupguard::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! async fn start(api: Arc<dyn ChatApi>) -> Result<()> {
//!     let config = BotConfig::from_env();
//!     let db = Arc::new(Database::open(Path::new("groupguard.db"))?);
//!     let engine = Arc::new(ModerationEngine::new(config, db, api));
//!
//!     // Feed platform updates into the intake loop
//!     let (events, rx) = mpsc::channel(256);
//!     tokio::spawn(Arc::clone(&engine).run(rx));
//!
//!     events
//!         .send(ChatEvent::NewMembers(NewMemberEvent {
//!             chat_id: -1001,
//!             chat_title: Some("My Group".into()),
//!             members: vec![UserRef {
//!                 user_id: 42,
//!                 username: Some("alice".into()),
//!                 first_name: "Alice".into(),
//!                 is_bot: false,
//!             }],
//!         }))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod config;
pub mod platforms;
pub mod storage;
pub mod bot;

// Re-export commonly used items
pub mod prelude {
    pub use crate::bot::admin_cache::AdminCache;
    pub use crate::bot::ModerationEngine;
    pub use crate::config::BotConfig;
    pub use crate::platforms::{ChatApi, MemberStatus};
    pub use crate::storage::Database;
    pub use crate::types::{
        ChatEvent, ChatSettings, GuardError, LeaderboardEntry, MessageEvent, MessageVerdict,
        NewMemberEvent, PointsEntry, UserRef, Violation, WarnOutcome, Warning,
    };
    pub use anyhow::Result;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
