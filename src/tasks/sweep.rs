//! Expired-Entry Sweep
//!
//! Optional background task that prunes expired secondary-store entries
//! for keys nobody reads again. Reads still evict lazily without it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TieredCache;

/// Spawns a task that calls `cleanup_expired` every `interval_secs`.
///
/// Returns `None` when `interval_secs` is 0, leaving expiry purely lazy.
/// The handle is aborted on shutdown.
pub fn spawn_sweep_task(cache: Arc<TieredCache>, interval_secs: u64) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        return None;
    }
    let interval = Duration::from_secs(interval_secs);

    Some(tokio::spawn(async move {
        info!(interval_secs, "starting secondary sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!(removed, "sweep removed expired secondary entries");
            } else {
                debug!("sweep found no expired entries");
            }
        }
    }))
}
