//! Joining, polling and leaving a room.

use tempo_protocol::{
    JoinRoomResult, LiveDifficulty, RoomId, RoomStatus, RoomUser,
};
use tempo_session::authenticate;
use tempo_store::{Store, Transaction};
use tokio::time::Instant;

use crate::{Member, RoomError, RoomManager};

impl<S: Store> RoomManager<S> {
    /// Puts the caller into `room_id` with the chosen difficulty.
    ///
    /// A caller who is already in the room only has their difficulty
    /// updated; occupancy doesn't change. Otherwise the checks run in
    /// this order: full, dissolved, not waiting. A missing room is
    /// [`JoinRoomResult::OtherError`].
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`](tempo_session::SessionError) if the
    /// token doesn't resolve.
    pub async fn join(
        &self,
        token: &str,
        room_id: RoomId,
        difficulty: LiveDifficulty,
    ) -> Result<JoinRoomResult, RoomError> {
        let mut tx = self.store.begin().await?;
        let me = authenticate(&mut tx, token).await?;
        let user_id = me.id();

        let Some(mut row) = tx.room_for_update(room_id).await? else {
            tracing::debug!(%room_id, %user_id, "join: room not found");
            return Ok(JoinRoomResult::OtherError);
        };
        let mut roster = self.roster(&row)?;

        if let Some(member) = roster.present_mut(user_id) {
            member.difficulty = difficulty;
            self.store_roster(&mut row, &roster)?;
            tx.update_room(row).await?;
            if me.room_id != Some(room_id) {
                tx.set_user_room(user_id, Some(room_id)).await?;
            }
            tx.commit().await?;
            tracing::debug!(%room_id, %user_id, "member refreshed difficulty");
            return Ok(JoinRoomResult::Ok);
        }

        if row.joined_user_count >= row.max_user_count {
            return Ok(JoinRoomResult::RoomFull);
        }
        match row.status {
            RoomStatus::Dissolved => return Ok(JoinRoomResult::Disbanded),
            RoomStatus::Playing => return Ok(JoinRoomResult::OtherError),
            RoomStatus::Waiting => {}
        }

        roster.push(Member::new(&me.user, difficulty));
        row.joined_user_count += 1;
        let joined = row.joined_user_count;
        self.store_roster(&mut row, &roster)?;
        tx.update_room(row).await?;
        tx.set_user_room(user_id, Some(room_id)).await?;
        tx.commit().await?;

        tracing::info!(%room_id, %user_id, joined, "player joined");
        Ok(JoinRoomResult::Ok)
    }

    /// Polls a room: its status and the members as the caller sees them.
    ///
    /// A missing room reads as `(Dissolved, [])`. A lobby that has been
    /// waiting for the start timeout is started on the host's behalf by
    /// this call, and the returned status already reflects that.
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`](tempo_session::SessionError) if the
    /// token doesn't resolve.
    pub async fn wait(
        &self,
        token: &str,
        room_id: RoomId,
    ) -> Result<(RoomStatus, Vec<RoomUser>), RoomError> {
        let mut tx = self.store.begin().await?;
        let me = authenticate(&mut tx, token).await?;
        let row = tx.room(room_id).await?;
        drop(tx);

        let now = Instant::now();
        let row = match row {
            Some(row)
                if row.status == RoomStatus::Waiting
                    && self.config.start_due(row.created_at, now) =>
            {
                self.start_if_due(room_id, now).await?.room
            }
            other => other,
        };
        let Some(row) = row else {
            return Ok((RoomStatus::Dissolved, Vec::new()));
        };

        let roster = self.roster(&row)?;
        Ok((row.status, roster.views(me.id(), row.host_user_id)))
    }

    /// Takes the caller out of `room_id`.
    ///
    /// The last member out deletes the room. A host who leaves hands the
    /// room to the longest-standing remaining member. A member who already
    /// submitted keeps their result in the room. Callers who aren't in the
    /// room, and missing rooms, change nothing.
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`](tempo_session::SessionError) if the
    /// token doesn't resolve.
    pub async fn leave(&self, token: &str, room_id: RoomId) -> Result<(), RoomError> {
        let mut tx = self.store.begin().await?;
        let me = authenticate(&mut tx, token).await?;
        let user_id = me.id();

        let Some(mut row) = tx.room_for_update(room_id).await? else {
            tracing::debug!(%room_id, %user_id, "leave: room not found");
            return Ok(());
        };
        let mut roster = self.roster(&row)?;
        let Some(departure) = roster.remove(user_id) else {
            tracing::debug!(%room_id, %user_id, "leave: not a member, ignored");
            return Ok(());
        };

        row.joined_user_count = row.joined_user_count.saturating_sub(1);
        if departure.had_result {
            row.completed_result_count = row.completed_result_count.saturating_sub(1);
        }

        let deleted = row.joined_user_count == 0;
        if deleted {
            tx.delete_room(room_id).await?;
        } else {
            if row.host_user_id == user_id {
                if let Some(next) = roster.first_present() {
                    row.host_user_id = next;
                    tracing::info!(%room_id, host = %next, "host handed over");
                }
            }
            if row.completed_result_count >= row.joined_user_count
                && row.status.can_advance_to(RoomStatus::Dissolved)
            {
                row.status = RoomStatus::Dissolved;
                tracing::info!(%room_id, "room dissolved");
            }
            self.store_roster(&mut row, &roster)?;
            tx.update_room(row).await?;
        }

        tx.clear_user_room(user_id, room_id).await?;
        tx.commit().await?;

        tracing::info!(%room_id, %user_id, "player left");
        if deleted {
            tracing::info!(%room_id, "last member left, room deleted");
        }
        Ok(())
    }
}
