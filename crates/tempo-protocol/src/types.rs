//! Core types shared by every Tempo layer.
//!
//! Identifiers, the room state machine labels, and the read-only views
//! that operations hand back to the API layer above. Everything here is
//! plain data: serializable, cheap to clone, and free of behavior that
//! needs storage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of judgement buckets in a play result (perfect, great, good,
/// bad, miss). Members who never report get this many `-1` entries.
pub const JUDGE_KINDS: usize = 5;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a registered user.
///
/// A "newtype wrapper" around `u64`: you can't accidentally pass a
/// `RoomId` where a `UserId` is expected, even though both are numbers
/// underneath. `#[serde(transparent)]` keeps the JSON form a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A unique identifier for a room (one lobby, one play session).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// Identifies the song/track a room is bound to.
///
/// `LiveId(0)` is reserved: in room listings it means "any live".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct LiveId(pub u32);

impl LiveId {
    /// The listing wildcard.
    pub const ANY: LiveId = LiveId(0);

    /// Returns `true` for the listing wildcard.
    pub fn is_any(&self) -> bool {
        *self == Self::ANY
    }
}

impl fmt::Display for LiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// LiveDifficulty
// ---------------------------------------------------------------------------

/// The difficulty a member picked for the room's live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveDifficulty {
    Normal,
    Hard,
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Transitions only ever move forward:
///
/// ```text
/// Waiting → Playing → Dissolved
/// ```
///
/// - **Waiting**: lobby is open, members join and pick difficulties.
/// - **Playing**: the host (or the staleness timeout) started the live.
/// - **Dissolved**: every member reported a result; the session is over.
///
/// A room whose last member left is deleted outright, so "not found" is
/// reported to pollers as `Dissolved` as well.
///
/// The derived `Ord` follows declaration order, which is also the
/// lifecycle order, and [`RoomStatus::can_advance_to`] relies on that.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
pub enum RoomStatus {
    Waiting,
    Playing,
    Dissolved,
}

impl RoomStatus {
    /// Returns `true` if moving to `target` goes forward.
    ///
    /// Skipping is allowed (a room whose members all report before the
    /// live was started goes straight from Waiting to Dissolved), going
    /// back or standing still is not.
    pub fn can_advance_to(self, target: Self) -> bool {
        target > self
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Playing => write!(f, "Playing"),
            Self::Dissolved => write!(f, "Dissolved"),
        }
    }
}

// ---------------------------------------------------------------------------
// JoinRoomResult
// ---------------------------------------------------------------------------

/// Outcome of a join attempt.
///
/// These are expected outcomes, not failures: the API layer maps each
/// one to a specific message for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinRoomResult {
    Ok,
    RoomFull,
    Disbanded,
    /// Room not found, or in a state the lobby doesn't accept joins in.
    OtherError,
}

impl fmt::Display for JoinRoomResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "Ok"),
            Self::RoomFull => write!(f, "RoomFull"),
            Self::Disbanded => write!(f, "Disbanded"),
            Self::OtherError => write!(f, "OtherError"),
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A user as other players may see them: no token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeUser {
    pub id: UserId,
    pub name: String,
    pub leader_card_id: u32,
}

/// A summary of a room returned in room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub live_id: LiveId,
    /// Number of members currently in the room.
    pub joined_user_count: usize,
    /// Maximum members allowed.
    pub max_user_count: usize,
}

/// One member of a room, as seen by the polling caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomUser {
    pub user_id: UserId,
    pub name: String,
    pub leader_card_id: u32,
    pub select_difficulty: LiveDifficulty,
    /// `true` for the caller's own entry.
    pub is_me: bool,
    pub is_host: bool,
}

/// One line of the final leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultUser {
    pub user_id: UserId,
    pub judge_count_list: Vec<i32>,
    pub score: i64,
}

impl ResultUser {
    /// The placeholder line for a member who never reported.
    pub fn absent(user_id: UserId) -> Self {
        Self {
            user_id,
            judge_count_list: vec![-1; JUDGE_KINDS],
            score: -1,
        }
    }

    /// Returns `true` if this line is the placeholder for a missing result.
    pub fn is_absent(&self) -> bool {
        self.score == -1 && self.judge_count_list.iter().all(|c| *c == -1)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UserId(7).to_string(), "U-7");
        assert_eq!(RoomId(3).to_string(), "R-3");
        assert_eq!(LiveId(12).to_string(), "L-12");
    }

    #[test]
    fn test_live_id_any_is_zero() {
        assert!(LiveId(0).is_any());
        assert!(!LiveId(1).is_any());
    }

    #[test]
    fn test_live_difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&LiveDifficulty::Hard).unwrap();
        assert_eq!(json, "\"hard\"");
    }

    #[test]
    fn test_room_status_can_advance_to_forward_only() {
        assert!(RoomStatus::Waiting.can_advance_to(RoomStatus::Playing));
        assert!(RoomStatus::Waiting.can_advance_to(RoomStatus::Dissolved));
        assert!(RoomStatus::Playing.can_advance_to(RoomStatus::Dissolved));
        assert!(!RoomStatus::Playing.can_advance_to(RoomStatus::Playing));
        assert!(!RoomStatus::Dissolved.can_advance_to(RoomStatus::Waiting));
        assert!(!RoomStatus::Playing.can_advance_to(RoomStatus::Waiting));
    }

    #[test]
    fn test_result_user_absent_uses_sentinels() {
        let line = ResultUser::absent(UserId(9));
        assert_eq!(line.judge_count_list, vec![-1, -1, -1, -1, -1]);
        assert_eq!(line.score, -1);
        assert!(line.is_absent());
    }

    #[test]
    fn test_result_user_with_score_is_not_absent() {
        let line = ResultUser {
            user_id: UserId(1),
            judge_count_list: vec![10, 2, 0, 0, 1],
            score: 9001,
        };
        assert!(!line.is_absent());
    }

    #[test]
    fn test_join_room_result_display() {
        assert_eq!(JoinRoomResult::RoomFull.to_string(), "RoomFull");
        assert_eq!(JoinRoomResult::OtherError.to_string(), "OtherError");
    }
}
