//! Background eviction of abandoned conversations.

use crate::dialogue::DialogueService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Spawns a task that evicts sessions and setup drafts idle for longer than
/// `ttl`, every `every`.
///
/// The task runs until the returned handle is aborted.
pub fn spawn_session_sweeper(
    dialogue: Arc<DialogueService>,
    ttl: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match dialogue.evict_idle(ttl).await {
                Ok(evicted) => debug!(evicted, "Session sweep done"),
                Err(err) => warn!(error = %err, "Session sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use transito_core::clock::FixedClock;
    use transito_core::session::{SessionStateMachine, SessionStore};
    use transito_infrastructure::{JsonCatalogRepository, JsonComboRepository, MemorySessionStore};

    #[tokio::test]
    async fn sweeper_evicts_stale_sessions() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = Arc::new(MemorySessionStore::new());
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
        ));
        let combos = Arc::new(JsonComboRepository::new(dir.path().join("combos.json")));
        let catalog = Arc::new(JsonCatalogRepository::new(dir.path().join("catalog.json")));
        let machine = Arc::new(
            SessionStateMachine::new(store.clone(), combos.clone(), catalog.clone())
                .with_clock(clock.clone()),
        );
        let dialogue = Arc::new(DialogueService::new(machine.clone(), combos, catalog));

        machine.start(1).await.unwrap();
        clock.advance(chrono::Duration::hours(3));

        let handle = spawn_session_sweeper(
            dialogue,
            Duration::from_secs(2 * 3600),
            Duration::from_millis(10),
        );
        for _ in 0..100 {
            if store.count().await.unwrap() == 0 {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
