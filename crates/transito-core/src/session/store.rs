//! Session storage abstraction.

use super::model::{ChatId, Session};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Holds the open session of every chat.
///
/// The state machine serializes access per chat before calling into the store,
/// so implementations only need to be safe for concurrent use across chats.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Result<Option<Session>>;

    /// Inserts or replaces the session for `session.chat_id`.
    async fn put(&self, session: Session) -> Result<()>;

    /// Removes the session for `chat_id` (no-op when absent).
    async fn delete(&self, chat_id: ChatId) -> Result<()>;

    /// Removes every session whose last activity is older than `cutoff`.
    ///
    /// # Returns
    ///
    /// The number of sessions removed.
    async fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    async fn count(&self) -> Result<usize>;
}
