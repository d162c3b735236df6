//! Creating and listing rooms.

use tempo_protocol::{LiveDifficulty, LiveId, RoomId, RoomInfo, RoomStatus};
use tempo_session::authenticate;
use tempo_store::{NewRoom, RoomFilter, Store, Transaction};
use tokio::time::Instant;

use crate::{RoomError, RoomManager, Roster};

impl<S: Store> RoomManager<S> {
    /// Opens a new lobby for `live_id` with the caller as host and only
    /// member, and points the caller's current room at it.
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`](tempo_session::SessionError) if the
    /// token doesn't resolve; nothing is created then.
    pub async fn create_room(
        &self,
        token: &str,
        live_id: LiveId,
        difficulty: LiveDifficulty,
    ) -> Result<RoomId, RoomError> {
        let mut tx = self.store.begin().await?;
        let me = authenticate(&mut tx, token).await?;

        let members = Roster::with_host(&me.user, difficulty)
            .encode(&self.codec)
            .map_err(|source| RoomError::Roster {
                room_id: None,
                source,
            })?;
        let room_id = tx
            .insert_room(NewRoom {
                live_id,
                host_user_id: me.id(),
                joined_user_count: 1,
                max_user_count: self.config.max_user_count,
                members,
                created_at: Instant::now(),
            })
            .await?;
        tx.set_user_room(me.id(), Some(room_id)).await?;
        tx.commit().await?;

        tracing::info!(%room_id, user_id = %me.id(), %live_id, "room created");
        Ok(room_id)
    }

    /// Lists lobbies still open for joining, emptiest first.
    ///
    /// Only `Waiting` rooms created within the listing window qualify.
    /// [`LiveId::ANY`] lists every live. The read takes no locks, so a room
    /// may fill up between listing and joining.
    pub async fn list_rooms(&self, live_id: LiveId) -> Result<Vec<RoomInfo>, RoomError> {
        let filter = RoomFilter {
            status: RoomStatus::Waiting,
            created_after: self.config.listing_cutoff(Instant::now()),
            live_id: (!live_id.is_any()).then_some(live_id),
        };

        let mut tx = self.store.begin().await?;
        let mut rows = tx.open_rooms(&filter).await?;
        rows.sort_by_key(|row| (row.joined_user_count, row.room_id));

        Ok(rows
            .into_iter()
            .map(|row| RoomInfo {
                room_id: row.room_id,
                live_id: row.live_id,
                joined_user_count: row.joined_user_count,
                max_user_count: row.max_user_count,
            })
            .collect())
    }
}
