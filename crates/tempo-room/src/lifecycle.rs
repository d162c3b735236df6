//! Starting play, by the host or by the lobby timeout.

use tempo_protocol::{RoomId, RoomStatus};
use tempo_session::authenticate;
use tempo_store::{RoomFilter, RoomRow, Store, Transaction};
use tokio::time::Instant;

use crate::{RoomError, RoomManager};

/// Outcome of [`RoomManager::start_if_due`].
pub(crate) struct AutoStart {
    /// This call moved the room to `Playing`.
    pub started: bool,
    /// The room after the check; `None` if it no longer exists.
    pub room: Option<RoomRow>,
}

impl AutoStart {
    fn unchanged(room: Option<RoomRow>) -> Self {
        Self {
            started: false,
            room,
        }
    }
}

impl<S: Store> RoomManager<S> {
    /// Starts the live in `room_id`.
    ///
    /// Only the host can start, and only a `Waiting` room: anything else is
    /// silently ignored.
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`](tempo_session::SessionError) if the
    /// token doesn't resolve.
    pub async fn start(&self, token: &str, room_id: RoomId) -> Result<(), RoomError> {
        let mut tx = self.store.begin().await?;
        let me = authenticate(&mut tx, token).await?;
        let user_id = me.id();

        if tx.start_room(room_id, user_id, Instant::now()).await? {
            tx.commit().await?;
            tracing::info!(%room_id, host = %user_id, "live started");
        } else {
            tracing::debug!(%room_id, %user_id, "start ignored: not the host of a waiting room");
        }
        Ok(())
    }

    /// Starts `room_id` on its host's behalf if the lobby has waited out
    /// the start timeout, and returns the room as it stands afterwards.
    ///
    /// Runs under the row lock, so a concurrent start, leave or host
    /// change is either fully before or fully after this check.
    pub(crate) async fn start_if_due(
        &self,
        room_id: RoomId,
        now: Instant,
    ) -> Result<AutoStart, RoomError> {
        let mut tx = self.store.begin().await?;
        let Some(row) = tx.room_for_update(room_id).await? else {
            return Ok(AutoStart::unchanged(None));
        };
        if row.status != RoomStatus::Waiting || !self.config.start_due(row.created_at, now) {
            return Ok(AutoStart::unchanged(Some(row)));
        }

        let host = row.host_user_id;
        if !tx.start_room(room_id, host, now).await? {
            return Ok(AutoStart::unchanged(Some(row)));
        }
        let room = tx.room(room_id).await?;
        tx.commit().await?;

        tracing::info!(%room_id, %host, "lobby timed out, live started");
        Ok(AutoStart {
            started: true,
            room,
        })
    }

    /// One sweep over every waiting lobby: starts those past the start
    /// timeout. Returns how many were started.
    ///
    /// Polls do the same thing room by room, so sweeping is never needed
    /// for correctness.
    pub async fn sweep_stale(&self) -> Result<usize, RoomError> {
        let now = Instant::now();
        let mut tx = self.store.begin().await?;
        let waiting = tx
            .open_rooms(&RoomFilter {
                status: RoomStatus::Waiting,
                created_after: None,
                live_id: None,
            })
            .await?;
        drop(tx);

        let mut started = 0;
        for row in waiting {
            if !self.config.start_due(row.created_at, now) {
                continue;
            }
            if self.start_if_due(row.room_id, now).await?.started {
                started += 1;
            }
        }
        Ok(started)
    }
}
