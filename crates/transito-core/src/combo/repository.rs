//! Combo assignment access traits.

use super::model::ComboAssignment;
use crate::error::Result;
use crate::session::ChatId;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Read-only view of line assignments, consumed by the state machine.
#[async_trait]
pub trait ComboRegistry: Send + Sync {
    /// Finds the assignment for `line` in `chat_id`.
    async fn find(&self, chat_id: ChatId, line: &str) -> Result<Option<ComboAssignment>>;

    /// All assignments of a chat, keyed by line code.
    async fn list_for_chat(&self, chat_id: ChatId) -> Result<BTreeMap<String, ComboAssignment>>;
}

/// Write side of the registry, used by the combo setup flow.
///
/// Concurrent writers are not reconciled: the last write wins.
#[async_trait]
pub trait ComboRepository: ComboRegistry {
    async fn assign(&self, chat_id: ChatId, line: &str, combo: ComboAssignment) -> Result<()>;
}
