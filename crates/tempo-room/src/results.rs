//! Collecting scores and serving the final leaderboard.

use tempo_protocol::{ResultUser, RoomId, RoomStatus};
use tempo_session::authenticate;
use tempo_store::{Store, Transaction};
use tokio::time::Instant;

use crate::{RoomError, RoomManager};

impl<S: Store> RoomManager<S> {
    /// Records the caller's play result.
    ///
    /// Submitting again replaces the earlier result without counting it
    /// twice. When every member has reported, the room dissolves.
    /// Non-members and missing rooms are silently ignored.
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`](tempo_session::SessionError) if the
    /// token doesn't resolve.
    pub async fn submit_result(
        &self,
        token: &str,
        room_id: RoomId,
        judge_count_list: Vec<i32>,
        score: i64,
    ) -> Result<(), RoomError> {
        let mut tx = self.store.begin().await?;
        let me = authenticate(&mut tx, token).await?;
        let user_id = me.id();

        let Some(mut row) = tx.room_for_update(room_id).await? else {
            tracing::debug!(%room_id, %user_id, "submit: room not found");
            return Ok(());
        };
        let mut roster = self.roster(&row)?;
        let Some(member) = roster.present_mut(user_id) else {
            tracing::debug!(%room_id, %user_id, "submit: not a member, ignored");
            return Ok(());
        };

        let first = !member.has_result();
        member.judge_count_list = Some(judge_count_list);
        member.score = Some(score);
        if first {
            row.completed_result_count += 1;
        }

        let dissolved = row.completed_result_count >= row.joined_user_count
            && row.status.can_advance_to(RoomStatus::Dissolved);
        if dissolved {
            row.status = RoomStatus::Dissolved;
        }
        let completed = row.completed_result_count;
        self.store_roster(&mut row, &roster)?;
        tx.update_room(row).await?;
        tx.commit().await?;

        tracing::info!(%room_id, %user_id, score, completed, "result submitted");
        if dissolved {
            tracing::info!(%room_id, "all results in, room dissolved");
        }
        Ok(())
    }

    /// Returns the leaderboard of `room_id`, in join order.
    ///
    /// Empty until every member has reported, unless the result timeout
    /// has passed since play started; then members without a result get
    /// placeholder lines (`-1` everywhere). Members who left after
    /// reporting are still listed.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room doesn't exist.
    pub async fn results(&self, room_id: RoomId) -> Result<Vec<ResultUser>, RoomError> {
        let mut tx = self.store.begin().await?;
        let row = tx
            .room(room_id)
            .await?
            .ok_or(RoomError::NotFound(room_id))?;

        let complete = row.completed_result_count >= row.joined_user_count;
        if !complete && !self.config.results_due(row.play_started_at, Instant::now()) {
            return Ok(Vec::new());
        }
        Ok(self.roster(&row)?.result_lines())
    }
}
