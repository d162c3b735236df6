//! # Tempo
//!
//! Room coordination core for a multiplayer rhythm game: users register,
//! open lobbies for a live, join them, start playing together, report
//! their scores and read the final leaderboard. Everything is safe under
//! concurrent callers; each room serializes its own mutations and rooms
//! never wait for each other.
//!
//! [`Matchmaker`] is the single entry point. It runs on any
//! [`Store`](tempo_store::Store); [`MemoryStore`](tempo_store::MemoryStore)
//! ships in the box.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tempo::prelude::*;
//!
//! # async fn demo() -> Result<(), TempoError> {
//! let tempo = Matchmaker::builder().build(MemoryStore::new()).await;
//!
//! let host = tempo.create_user("kana", 12).await?;
//! let room = tempo.create_room(&host, LiveId(3), LiveDifficulty::Hard).await?;
//! tempo.start(&host, room).await?;
//! tempo.submit_result(&host, room, vec![120, 8, 1, 0, 0], 981_250).await?;
//! let leaderboard = tempo.results(room).await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod logging;
mod matchmaker;

pub use error::TempoError;
pub use matchmaker::{Matchmaker, MatchmakerBuilder};

/// Everything needed to drive a [`Matchmaker`].
pub mod prelude {
    pub use crate::{Matchmaker, MatchmakerBuilder, TempoError};
    pub use tempo_protocol::{
        JoinRoomResult, LiveDifficulty, LiveId, ResultUser, RoomId, RoomInfo,
        RoomStatus, RoomUser, SafeUser, UserId,
    };
    pub use tempo_room::RoomConfig;
    pub use tempo_session::{Identity, RandomTokens, TokenSource};
    pub use tempo_store::{MemoryStore, Store};
}
