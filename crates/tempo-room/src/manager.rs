//! Room manager: the entry point for every room operation.
//!
//! The operations themselves live in one module per concern, each adding
//! an `impl` block to [`RoomManager`]:
//!
//! | Module | Operations |
//! |---|---|
//! | `registry` | `create_room`, `list_rooms` |
//! | `membership` | `join`, `wait`, `leave` |
//! | `lifecycle` | `start`, `sweep_stale` |
//! | `results` | `submit_result`, `results` |
//!
//! All of them follow the same shape: open a transaction, authenticate
//! the token, lock the room row, decode the roster, change it, write it
//! back, commit. Returning early drops the transaction, which rolls back
//! and releases the lock.

use std::sync::Arc;

use tempo_protocol::{JsonCodec, RoomId};
use tempo_store::{RoomRow, Store, Transaction};

use crate::{RoomConfig, RoomError, Roster};

/// Runs room operations against a [`Store`].
///
/// Holds no room state of its own: everything lives in the store, so any
/// number of managers (or clones of one) may share a store.
pub struct RoomManager<S> {
    pub(crate) store: Arc<S>,
    pub(crate) config: RoomConfig,
    pub(crate) codec: JsonCodec,
}

impl<S> Clone for RoomManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            codec: self.codec,
        }
    }
}

impl<S: Store> RoomManager<S> {
    /// Creates a manager with the given config.
    pub fn new(store: Arc<S>, mut config: RoomConfig) -> Self {
        if config.max_user_count == 0 {
            tracing::warn!("max_user_count of 0 leaves no seat for the creator, using 1");
            config.max_user_count = 1;
        }
        Self {
            store,
            config,
            codec: JsonCodec,
        }
    }

    /// Returns the room settings in use.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub(crate) fn roster(&self, row: &RoomRow) -> Result<Roster, RoomError> {
        Roster::decode(&self.codec, &row.members).map_err(|source| {
            tracing::error!(room_id = %row.room_id, error = %source, "stored roster is corrupt");
            RoomError::Roster {
                room_id: Some(row.room_id),
                source,
            }
        })
    }

    pub(crate) fn store_roster(
        &self,
        row: &mut RoomRow,
        roster: &Roster,
    ) -> Result<(), RoomError> {
        row.members = roster
            .encode(&self.codec)
            .map_err(|source| RoomError::Roster {
                room_id: Some(row.room_id),
                source,
            })?;
        Ok(())
    }

    /// Reads a room's roster without locking. `None` if the room is gone.
    pub async fn roster_of(&self, room_id: RoomId) -> Result<Option<Roster>, RoomError> {
        let mut tx = self.store.begin().await?;
        match tx.room(room_id).await? {
            Some(row) => Ok(Some(self.roster(&row)?)),
            None => Ok(None),
        }
    }
}
