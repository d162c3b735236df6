//! `Matchmaker` builder and facade.
//!
//! Ties the layers together: identity (session) → rooms → store. Every
//! operation a client can call is one method here.

use std::sync::Arc;
use std::time::Duration;

use tempo_protocol::{
    JoinRoomResult, LiveDifficulty, LiveId, ResultUser, RoomId, RoomInfo, RoomStatus,
    RoomUser, SafeUser,
};
use tempo_room::{RoomConfig, RoomManager, SweepConfig, spawn_sweeper};
use tempo_session::{Identity, IdentityResolver, RandomTokens, TokenSource};
use tempo_store::{MemoryStore, Store};
use tokio::task::JoinHandle;

use crate::TempoError;

/// Builder for a [`Matchmaker`].
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use tempo::prelude::*;
///
/// # async fn demo() {
/// let tempo = Matchmaker::builder()
///     .room_config(RoomConfig {
///         max_user_count: 6,
///         ..Default::default()
///     })
///     .sweep_interval(Duration::from_secs(15))
///     .build(MemoryStore::new())
///     .await;
/// # }
/// ```
pub struct MatchmakerBuilder {
    room_config: RoomConfig,
    sweep: SweepConfig,
    tokens: Arc<dyn TokenSource>,
}

impl MatchmakerBuilder {
    /// Creates a builder with default settings: four players per room,
    /// five-minute timeouts, random tokens, no sweeper.
    pub fn new() -> Self {
        Self {
            room_config: RoomConfig::default(),
            sweep: SweepConfig::default(),
            tokens: Arc::new(RandomTokens),
        }
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Runs a background sweep every `interval`. A zero interval disables
    /// the sweeper.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep.interval = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Sets where bearer tokens come from.
    pub fn token_source(mut self, tokens: impl TokenSource) -> Self {
        self.tokens = Arc::new(tokens);
        self
    }

    /// Builds the matchmaker on top of `store`, starting the sweeper if
    /// one was configured.
    pub async fn build<S: Store>(self, store: S) -> Matchmaker<S> {
        let store = Arc::new(store);
        let identities = IdentityResolver::with_tokens(Arc::clone(&store), self.tokens);
        let rooms = RoomManager::new(store, self.room_config);

        let sweeper = self.sweep.interval.map(|interval| {
            tracing::info!(?interval, "starting room sweeper");
            spawn_sweeper(rooms.clone(), interval)
        });

        Matchmaker {
            identities,
            rooms,
            sweeper,
        }
    }
}

impl Default for MatchmakerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The room-coordination service.
///
/// Cheap to share: wrap it in an `Arc` and call it from as many tasks as
/// needed. Dropping it stops the sweeper.
pub struct Matchmaker<S: Store = MemoryStore> {
    identities: IdentityResolver<S>,
    rooms: RoomManager<S>,
    sweeper: Option<JoinHandle<()>>,
}

impl Matchmaker<MemoryStore> {
    /// Creates a builder.
    pub fn builder() -> MatchmakerBuilder {
        MatchmakerBuilder::new()
    }

    /// A matchmaker with default settings on a fresh [`MemoryStore`].
    pub async fn in_memory() -> Self {
        MatchmakerBuilder::new().build(MemoryStore::new()).await
    }
}

impl<S: Store> Matchmaker<S> {
    /// The identity layer.
    pub fn identities(&self) -> &IdentityResolver<S> {
        &self.identities
    }

    /// The room layer.
    pub fn rooms(&self) -> &RoomManager<S> {
        &self.rooms
    }

    // -- identity ---------------------------------------------------------

    /// Registers a user and returns their bearer token.
    pub async fn create_user(
        &self,
        name: &str,
        leader_card_id: u32,
    ) -> Result<String, TempoError> {
        Ok(self.identities.create_user(name, leader_card_id).await?)
    }

    /// Resolves a token to its user and current room, `None` if unknown.
    pub async fn resolve(&self, token: &str) -> Result<Option<Identity>, TempoError> {
        Ok(self.identities.resolve(token).await?)
    }

    /// The caller's own profile.
    pub async fn me(&self, token: &str) -> Result<SafeUser, TempoError> {
        Ok(self.identities.me(token).await?)
    }

    /// Changes the caller's name and leader card. Unknown tokens are
    /// ignored.
    pub async fn update_profile(
        &self,
        token: &str,
        name: &str,
        leader_card_id: u32,
    ) -> Result<(), TempoError> {
        Ok(self
            .identities
            .update_profile(token, name, leader_card_id)
            .await?)
    }

    // -- rooms ------------------------------------------------------------

    /// Opens a lobby with the caller as host.
    pub async fn create_room(
        &self,
        token: &str,
        live_id: LiveId,
        difficulty: LiveDifficulty,
    ) -> Result<RoomId, TempoError> {
        Ok(self.rooms.create_room(token, live_id, difficulty).await?)
    }

    /// Lists joinable lobbies, emptiest first. [`LiveId::ANY`] lists all.
    pub async fn list_rooms(&self, live_id: LiveId) -> Result<Vec<RoomInfo>, TempoError> {
        Ok(self.rooms.list_rooms(live_id).await?)
    }

    /// Joins a lobby.
    pub async fn join(
        &self,
        token: &str,
        room_id: RoomId,
        difficulty: LiveDifficulty,
    ) -> Result<JoinRoomResult, TempoError> {
        Ok(self.rooms.join(token, room_id, difficulty).await?)
    }

    /// Polls a room's status and members.
    pub async fn wait(
        &self,
        token: &str,
        room_id: RoomId,
    ) -> Result<(RoomStatus, Vec<RoomUser>), TempoError> {
        Ok(self.rooms.wait(token, room_id).await?)
    }

    /// Leaves a room.
    pub async fn leave(&self, token: &str, room_id: RoomId) -> Result<(), TempoError> {
        Ok(self.rooms.leave(token, room_id).await?)
    }

    /// Starts the live (host only).
    pub async fn start(&self, token: &str, room_id: RoomId) -> Result<(), TempoError> {
        Ok(self.rooms.start(token, room_id).await?)
    }

    /// Reports the caller's play result.
    pub async fn submit_result(
        &self,
        token: &str,
        room_id: RoomId,
        judge_count_list: Vec<i32>,
        score: i64,
    ) -> Result<(), TempoError> {
        Ok(self
            .rooms
            .submit_result(token, room_id, judge_count_list, score)
            .await?)
    }

    /// Reads the final leaderboard.
    pub async fn results(&self, room_id: RoomId) -> Result<Vec<ResultUser>, TempoError> {
        Ok(self.rooms.results(room_id).await?)
    }
}

impl<S: Store> Drop for Matchmaker<S> {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
