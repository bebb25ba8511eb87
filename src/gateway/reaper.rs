//! Background purge of expired sessions and pending authorizations.
//!
//! Both tables already treat expired entries as absent; the reaper only bounds
//! memory for browsers that never come back.

use super::GatewayState;
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::debug;

/// Spawn a task that purges both tables every `interval`.
pub fn spawn_reaper(state: Arc<GatewayState>, interval: Duration) -> tokio::task::JoinHandle<()> {
    let interval = if interval.is_zero() {
        Duration::from_secs(1)
    } else {
        interval
    };

    tokio::spawn(async move {
        loop {
            sleep(interval).await;
            let (pending, sessions) = reap(&state).await;
            if pending > 0 || sessions > 0 {
                debug!(pending, sessions, "Purged expired entries");
            }
        }
    })
}

/// Run one purge pass, returning `(pending, sessions)` removed.
pub async fn reap(state: &GatewayState) -> (usize, usize) {
    let pending = state.flow().pending().purge_expired().await;
    let sessions = state.flow().sessions().purge_expired().await;
    (pending, sessions)
}
