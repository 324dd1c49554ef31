//! Polling loop behaviour against an in-memory transport.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use transito_application::{AppContext, BotRunner};
use transito_core::session::{InboundEvent, OutboundMessage, Token};
use transito_core::{Result, TransitoError};
use transito_infrastructure::AppConfig;
use transito_interaction::{Backoff, ChatTransport, IncomingUpdate};

const CHAT: i64 = 500;

// Mock ChatTransport for testing
#[derive(Default)]
struct MockTransport {
    batches: Mutex<VecDeque<Result<Vec<IncomingUpdate>>>>,
    offsets: Mutex<Vec<Option<i64>>>,
    sent: Mutex<Vec<OutboundMessage>>,
    acknowledged: Mutex<Vec<String>>,
    fail_sends: bool,
}

impl MockTransport {
    fn queue(&self, batch: Result<Vec<IncomingUpdate>>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn poll(&self, offset: Option<i64>, _timeout: Duration) -> Result<Vec<IncomingUpdate>> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        if self.fail_sends {
            return Err(TransitoError::transport("send refused"));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<()> {
        self.acknowledged
            .lock()
            .unwrap()
            .push(callback_id.to_string());
        Ok(())
    }
}

fn text(update_id: i64, text: &str) -> IncomingUpdate {
    IncomingUpdate {
        update_id,
        event: Some(InboundEvent::text(CHAT, text)),
        callback_id: None,
    }
}

fn press(update_id: i64, token: Token) -> IncomingUpdate {
    IncomingUpdate {
        update_id,
        event: Some(InboundEvent::token(CHAT, &token)),
        callback_id: Some(format!("cb-{update_id}")),
    }
}

fn context(dir: &TempDir) -> AppContext {
    AppContext::from_config(&AppConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    })
}

#[tokio::test]
async fn poll_once_acknowledges_replies_and_advances_offset() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let transport = Arc::new(MockTransport::default());
    transport.queue(Ok(vec![
        text(40, "/start"),
        press(41, Token::StartReport),
        IncomingUpdate {
            update_id: 42,
            event: None,
            callback_id: None,
        },
    ]));

    let mut runner = BotRunner::new(transport.clone(), ctx.dialogue.clone());
    assert_eq!(runner.poll_once().await.unwrap(), 3);

    assert_eq!(runner.offset(), Some(43));
    assert_eq!(*transport.acknowledged.lock().unwrap(), vec!["cb-41"]);
    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].text.contains("Current assignments"));
    assert!(sent[1].tokens().any(|t| t == "t_ll_M1"));

    runner.poll_once().await.unwrap();
    assert_eq!(transport.offsets.lock().unwrap()[1], Some(43));
}

#[tokio::test]
async fn failed_delivery_keeps_session_state() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let transport = Arc::new(MockTransport {
        fail_sends: true,
        ..MockTransport::default()
    });
    transport.queue(Ok(vec![press(1, Token::StartReport)]));

    let mut runner = BotRunner::new(transport.clone(), ctx.dialogue.clone());
    runner.poll_once().await.unwrap();

    assert!(ctx.machine.has_session(CHAT).await.unwrap());
}

#[tokio::test]
async fn loop_backs_off_after_errors_and_stops_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let transport = Arc::new(MockTransport::default());
    transport.queue(Err(TransitoError::transport("network down")));
    transport.queue(Err(TransitoError::transport("network down")));
    transport.queue(Ok(vec![text(7, "/menu")]));

    let runner = BotRunner::new(transport.clone(), ctx.dialogue.clone())
        .with_backoff(Backoff::new(Duration::from_millis(1), Duration::from_millis(5)));
    runner
        .run_until(tokio::time::sleep(Duration::from_millis(300)))
        .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("Current assignments"));
    let offsets = transport.offsets.lock().unwrap().clone();
    assert!(offsets.len() >= 4);
    assert_eq!(offsets[..3], [None, None, None]);
    assert_eq!(offsets[3], Some(8));
}
