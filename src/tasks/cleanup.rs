//! TTL Cleanup Task
//!
//! Background task that periodically removes expired entries from the
//! memory backend. Redis expires keys on its own and needs no sweep.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::MemoryBackend;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let backend = MemoryBackend::new();
/// let cleanup_handle = spawn_cleanup_task(backend.clone(), 1);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(backend: MemoryBackend, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = backend.cleanup_expired().await;

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
