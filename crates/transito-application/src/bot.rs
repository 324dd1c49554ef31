//! Long-polling loop connecting a chat transport to the dialogue service.

use crate::dialogue::DialogueService;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use transito_core::Result;
use transito_interaction::{Backoff, ChatTransport, IncomingUpdate};

pub struct BotRunner {
    transport: Arc<dyn ChatTransport>,
    dialogue: Arc<DialogueService>,
    poll_timeout: Duration,
    backoff: Backoff,
    offset: Option<i64>,
}

impl BotRunner {
    pub fn new(transport: Arc<dyn ChatTransport>, dialogue: Arc<DialogueService>) -> Self {
        Self {
            transport,
            dialogue,
            poll_timeout: Duration::from_secs(25),
            backoff: Backoff::default(),
            offset: None,
        }
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Next update id the runner will ask for.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Polls once and processes whatever arrived. Returns the number of updates.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self.transport.poll(self.offset, self.poll_timeout).await?;
        let count = updates.len();
        self.process(updates).await;
        Ok(count)
    }

    /// Runs until `shutdown` completes. Poll failures back off; they never end the loop.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(timeout_secs = self.poll_timeout.as_secs(), "Polling for updates");

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.transport.poll(self.offset, self.poll_timeout) => polled,
            };

            match polled {
                Ok(updates) => {
                    self.backoff.reset();
                    self.process(updates).await;
                }
                Err(err) => {
                    let delay = self.backoff.next_delay();
                    warn!(error = %err, delay_secs = delay.as_secs(), "Polling failed, retrying");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        info!("Polling stopped");
    }

    /// Handles updates one at a time, in arrival order.
    async fn process(&mut self, updates: Vec<IncomingUpdate>) {
        for update in updates {
            let next = update.update_id + 1;
            self.offset = Some(self.offset.map_or(next, |offset| offset.max(next)));

            if let Some(callback_id) = &update.callback_id {
                if let Err(err) = self.transport.acknowledge(callback_id).await {
                    warn!(error = %err, "Failed to acknowledge selection");
                }
            }

            let Some(event) = update.event else {
                continue;
            };

            let replies = match self.dialogue.handle(&event).await {
                Ok(replies) => replies,
                Err(err) => {
                    error!(chat_id = event.chat_id, error = %err, "Failed to handle event");
                    continue;
                }
            };

            for reply in replies {
                if let Err(err) = self.transport.send(&reply).await {
                    warn!(chat_id = reply.chat_id, error = %err, "Failed to deliver reply");
                }
            }
        }
    }
}
