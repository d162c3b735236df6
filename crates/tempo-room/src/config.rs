//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Five minutes, the default for every staleness window.
const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room a [`RoomManager`](crate::RoomManager)
/// creates.
///
/// Override fields individually:
///
/// ```rust
/// use std::time::Duration;
/// use tempo_room::RoomConfig;
///
/// let config = RoomConfig {
///     max_user_count: 2,
///     start_timeout: Duration::from_secs(60),
///     ..Default::default()
/// };
/// assert_eq!(config.listing_window, Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Capacity stamped on new rooms. The creator takes a seat, so
    /// [`RoomManager::new`](crate::RoomManager::new) raises 0 to 1.
    pub max_user_count: usize,

    /// How long a room may sit in the lobby before the next poll starts
    /// it on the host's behalf.
    pub start_timeout: Duration,

    /// Rooms older than this no longer show up in listings.
    pub listing_window: Duration,

    /// How long after play starts results are served with placeholders
    /// for members who never reported.
    pub result_timeout: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_user_count: 4,
            start_timeout: FIVE_MINUTES,
            listing_window: FIVE_MINUTES,
            result_timeout: FIVE_MINUTES,
        }
    }
}

impl RoomConfig {
    /// Returns `true` if a lobby created at `created_at` is due for an
    /// automatic start at `now`.
    pub fn start_due(&self, created_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(created_at) >= self.start_timeout
    }

    /// Returns `true` if results may be finalized at `now` regardless of
    /// missing submissions. A room that never started has no timeout.
    pub fn results_due(&self, play_started_at: Option<Instant>, now: Instant) -> bool {
        play_started_at
            .is_some_and(|started| now.saturating_duration_since(started) >= self.result_timeout)
    }

    /// Earliest creation instant (exclusive) that still gets listed at
    /// `now`. `None` when the process is younger than the window, in
    /// which case every room qualifies.
    pub fn listing_cutoff(&self, now: Instant) -> Option<Instant> {
        now.checked_sub(self.listing_window)
    }
}

// ---------------------------------------------------------------------------
// SweepConfig
// ---------------------------------------------------------------------------

/// Settings for the optional background sweeper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Time between sweeps. `None` disables the sweeper; polls still
    /// start stale lobbies on their own.
    pub interval: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default_values() {
        let config = RoomConfig::default();
        assert_eq!(config.max_user_count, 4);
        assert_eq!(config.start_timeout, Duration::from_secs(300));
        assert_eq!(config.result_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_start_due_at_exact_boundary() {
        let config = RoomConfig::default();
        let created = Instant::now();

        assert!(!config.start_due(created, created + Duration::from_secs(299)));
        assert!(config.start_due(created, created + Duration::from_secs(300)));
    }

    #[test]
    fn test_results_due_without_play_start_is_false() {
        let config = RoomConfig::default();
        let now = Instant::now() + Duration::from_secs(3600);
        assert!(!config.results_due(None, now));
    }

    #[test]
    fn test_results_due_after_timeout() {
        let config = RoomConfig::default();
        let started = Instant::now();

        assert!(!config.results_due(Some(started), started + Duration::from_secs(10)));
        assert!(config.results_due(Some(started), started + Duration::from_secs(300)));
    }

    #[test]
    fn test_sweep_config_disabled_by_default() {
        assert_eq!(SweepConfig::default().interval, None);
    }

    #[test]
    fn test_room_config_serializes_round_trip() {
        let config = RoomConfig {
            max_user_count: 6,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: RoomConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
