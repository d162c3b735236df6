//! Error types for the storage layer.

use tempo_protocol::RoomId;

/// Errors a [`Store`](crate::Store) implementation can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert collided with a unique column (e.g. a user token).
    /// Carries the column name only: tokens are secrets.
    #[error("unique constraint violated on {field}")]
    UniqueViolation { field: &'static str },

    /// A write targeted a room row this transaction never locked with
    /// `room_for_update` (or already deleted).
    #[error("room {0} is not locked by this transaction")]
    NotLocked(RoomId),
}
