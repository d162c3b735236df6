//! Error types for the room layer.
//!
//! Expected join outcomes (full, disbanded, ...) are not errors; they come
//! back as [`JoinRoomResult`](tempo_protocol::JoinRoomResult) values.

use tempo_protocol::{ProtocolError, RoomId};
use tempo_session::SessionError;
use tempo_store::StoreError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Token resolution failed (most often an invalid token).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A room's member blob could not be encoded or decoded. `room_id` is
    /// `None` while the room is still being created.
    #[error(
        "roster of room {} is unreadable",
        .room_id.map_or_else(|| "(new)".to_owned(), |id| id.to_string())
    )]
    Roster {
        room_id: Option<RoomId>,
        #[source]
        source: ProtocolError,
    },
}

impl RoomError {
    /// Returns `true` if the caller's token didn't resolve.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Self::Session(SessionError::InvalidToken))
    }
}
