//! Transport abstraction between the dialogue layer and a chat platform.

use async_trait::async_trait;
use std::time::Duration;
use transito_core::Result;
use transito_core::session::{InboundEvent, OutboundMessage};

/// One item received from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingUpdate {
    /// Monotonic id; the next poll starts after the highest one seen.
    pub update_id: i64,
    /// `None` for updates the bot does not act on (joins, edits, stickers).
    pub event: Option<InboundEvent>,
    /// Set when the update is a button press that must be acknowledged.
    pub callback_id: Option<String>,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Long-polls for updates with id `>= offset`.
    async fn poll(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<IncomingUpdate>>;

    async fn send(&self, message: &OutboundMessage) -> Result<()>;

    /// Acknowledges a button press so the client stops its spinner.
    async fn acknowledge(&self, callback_id: &str) -> Result<()>;
}
