//! Background expiry reaper (spec §4.8: "runs every `cleanup_interval_seconds`
//! ... destroying any with `now - last_activity > timeout_seconds`"),
//! grounded on the teacher's `SessionManager::start_cleanup_task`
//! interval-plus-shutdown-channel pattern.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::store::SessionStore;

/// Spawn the reaper loop. Returns a sender that, set to `true`, stops it.
pub fn spawn(store: Arc<SessionStore>, cleanup_interval_seconds: u64, timeout_seconds: i64) -> watch::Sender<bool> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(cleanup_interval_seconds.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.reap_expired(timeout_seconds);
                    if removed > 0 {
                        tracing::info!(removed, "reaped expired sessions");
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("session reaper shutting down");
                        break;
                    }
                }
            }
        }
    });

    shutdown_tx
}
