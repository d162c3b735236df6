//! Background sweeper: starts stale lobbies on a fixed interval.
//!
//! Every poll already starts its own room once the lobby timeout passes,
//! so the sweeper only makes that happen without a poll. It never does
//! anything a poll wouldn't do.

use std::time::Duration;

use tempo_store::Store;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::RoomManager;

/// Shortest accepted sweep interval.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Spawns a task that calls [`RoomManager::sweep_stale`] every `interval`.
///
/// Intervals below [`MIN_SWEEP_INTERVAL`] are raised to it. A sweep that
/// runs long makes the sweeper skip the ticks it missed instead of firing
/// them back to back. Abort the returned handle to stop it.
pub fn spawn_sweeper<S: Store>(manager: RoomManager<S>, interval: Duration) -> JoinHandle<()> {
    if interval < MIN_SWEEP_INTERVAL {
        tracing::warn!(?interval, min = ?MIN_SWEEP_INTERVAL, "sweep interval too short, raised");
    }
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        tracing::debug!(?interval, "room sweeper running");
        loop {
            ticker.tick().await;
            match manager.sweep_stale().await {
                Ok(0) => {}
                Ok(started) => tracing::debug!(started, "sweep started stale lobbies"),
                Err(e) => tracing::warn!(error = %e, "room sweep failed"),
            }
        }
    })
}
