//! Row shapes exchanged with a [`Store`](crate::Store).

use tempo_protocol::{LiveId, RoomId, RoomStatus, UserId};
use tokio::time::Instant;

/// A stored user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub leader_card_id: u32,
    /// Opaque bearer token, unique across all users.
    pub token: String,
    /// The room this user was last placed in, if any.
    pub room_id: Option<RoomId>,
}

/// Values for a user insert. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub leader_card_id: u32,
    pub token: String,
}

/// A stored room record.
///
/// `members` is the roster blob: the room layer encodes and decodes it,
/// the store only moves the bytes together with the rest of the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRow {
    pub room_id: RoomId,
    pub live_id: LiveId,
    pub host_user_id: UserId,
    pub status: RoomStatus,
    pub joined_user_count: usize,
    pub max_user_count: usize,
    pub completed_result_count: usize,
    pub members: Vec<u8>,
    pub created_at: Instant,
    pub play_started_at: Option<Instant>,
}

/// Values for a room insert. The store assigns the id; new rooms start
/// `Waiting` with no results and no play start.
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub live_id: LiveId,
    pub host_user_id: UserId,
    pub joined_user_count: usize,
    pub max_user_count: usize,
    pub members: Vec<u8>,
    pub created_at: Instant,
}

/// Selection for [`Transaction::open_rooms`](crate::Transaction::open_rooms).
#[derive(Debug, Clone)]
pub struct RoomFilter {
    pub status: RoomStatus,
    /// Only rooms created strictly after this instant. `None` selects
    /// every age.
    pub created_after: Option<Instant>,
    /// `None` selects every live.
    pub live_id: Option<LiveId>,
}

impl RoomFilter {
    /// Returns `true` if `row` satisfies the filter.
    pub fn matches(&self, row: &RoomRow) -> bool {
        row.status == self.status
            && self.created_after.is_none_or(|after| row.created_at > after)
            && self.live_id.is_none_or(|live| row.live_id == live)
    }
}
