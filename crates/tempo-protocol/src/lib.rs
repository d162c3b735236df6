//! Shared vocabulary for Tempo.
//!
//! This crate defines the "language" every other Tempo crate speaks:
//!
//! - **Types** ([`UserId`], [`RoomId`], [`RoomStatus`], [`RoomUser`], etc.):
//!   identifiers, state machine labels, and the views handed back to callers.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how structured blobs such
//!   as a room's member roster are turned into bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits underneath storage, identity and rooms. It
//! doesn't know about transactions or locks; it only knows the shapes
//! of the data those layers move around.
//!
//! ```text
//! Protocol (types, codec) → Store (rows) → Session (identity) → Room (lobby)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    JUDGE_KINDS, JoinRoomResult, LiveDifficulty, LiveId, ResultUser, RoomId,
    RoomInfo, RoomStatus, RoomUser, SafeUser, UserId,
};
