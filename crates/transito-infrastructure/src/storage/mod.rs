//! File storage primitives.

mod atomic_json;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};

use tokio::task;
use transito_core::{Result, TransitoError};

/// Runs synchronous file work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| TransitoError::io(format!("Failed to spawn blocking task: {e}")))?
}
