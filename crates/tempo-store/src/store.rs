//! The `Store` and `Transaction` traits: the storage seam.
//!
//! Every Tempo operation is written against these two traits, never
//! against a concrete database. Methods return `impl Future + Send`, so
//! generic callers such as the room sweeper can spawn them.

use std::future::Future;

use tempo_protocol::{RoomId, UserId};
use tokio::time::Instant;

use crate::{NewRoom, NewUser, RoomFilter, RoomRow, StoreError, UserRow};

/// A source of transactions.
pub trait Store: Send + Sync + 'static {
    /// The unit-of-work type this store hands out.
    type Tx: Transaction;

    /// Opens a new transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send;
}

/// One all-or-nothing unit of work.
///
/// # Isolation
///
/// Plain reads ([`user_by_token`](Self::user_by_token),
/// [`room`](Self::room)) see committed data plus this transaction's own
/// staged writes and never wait for row locks.
/// [`open_rooms`](Self::open_rooms) sees committed data only.
/// [`room_for_update`](Self::room_for_update) takes the row's exclusive
/// lock and holds it until the transaction commits or is dropped.
///
/// # Rollback
///
/// Dropping a transaction without calling [`commit`](Self::commit)
/// discards every staged write and releases every lock.
pub trait Transaction: Send + Sized {
    /// Inserts a user and returns the assigned id.
    ///
    /// # Errors
    /// [`StoreError::UniqueViolation`] if the token is already taken.
    fn insert_user(
        &mut self,
        user: NewUser,
    ) -> impl Future<Output = Result<UserId, StoreError>> + Send;

    /// Looks a user up by bearer token.
    fn user_by_token(
        &mut self,
        token: &str,
    ) -> impl Future<Output = Result<Option<UserRow>, StoreError>> + Send;

    /// Sets name and leader card for the user holding `token`.
    ///
    /// Returns `false` when no user matched.
    fn update_user(
        &mut self,
        token: &str,
        name: &str,
        leader_card_id: u32,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Points a user's current-room reference at `room_id`.
    fn set_user_room(
        &mut self,
        user_id: UserId,
        room_id: Option<RoomId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Conditioned update: clears a user's current-room reference, but only
    /// if it still points at `room_id` when the transaction commits. A
    /// concurrent move to another room wins.
    fn clear_user_room(
        &mut self,
        user_id: UserId,
        room_id: RoomId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Inserts a room and returns the assigned id. The new row counts as
    /// locked by this transaction.
    fn insert_room(
        &mut self,
        room: NewRoom,
    ) -> impl Future<Output = Result<RoomId, StoreError>> + Send;

    /// Reads a room without locking it.
    fn room(
        &mut self,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Option<RoomRow>, StoreError>> + Send;

    /// Locks a room row exclusively, then reads it.
    ///
    /// Waits while another transaction holds the lock. Returns `None` if
    /// the room doesn't exist (including when it was deleted while this
    /// call waited).
    fn room_for_update(
        &mut self,
        room_id: RoomId,
    ) -> impl Future<Output = Result<Option<RoomRow>, StoreError>> + Send;

    /// Stages a new version of a room locked by this transaction.
    ///
    /// # Errors
    /// [`StoreError::NotLocked`] if the row wasn't locked first.
    fn update_room(
        &mut self,
        row: RoomRow,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Conditioned update: moves the room to `Playing` and records `at` as
    /// the play start, but only if `host` is the room's host and the room
    /// is still `Waiting`. Locks the row like any other update.
    ///
    /// Returns `true` if the row matched.
    fn start_room(
        &mut self,
        room_id: RoomId,
        host: UserId,
        at: Instant,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Stages the deletion of a room locked by this transaction.
    ///
    /// # Errors
    /// [`StoreError::NotLocked`] if the row wasn't locked first.
    fn delete_room(
        &mut self,
        room_id: RoomId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads every committed room matching `filter`, in room id order.
    fn open_rooms(
        &mut self,
        filter: &RoomFilter,
    ) -> impl Future<Output = Result<Vec<RoomRow>, StoreError>> + Send;

    /// Applies every staged write atomically and releases all locks.
    ///
    /// # Errors
    /// [`StoreError::UniqueViolation`] if a staged user insert collided
    /// with a user committed in the meantime. Nothing is applied then.
    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
