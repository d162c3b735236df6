//! In-process implementation of the storage seam.
//!
//! # Locking model
//!
//! Each room lives in a [`RoomSlot`] with two independent locks:
//!
//! - `lock`: the row's exclusive lock. A transaction acquires it in
//!   `room_for_update` and keeps the owned guard until it commits or is
//!   dropped, exactly like "select ... for update" in a SQL database.
//! - `committed`: the last committed version of the row. Writers replace
//!   it at commit time; plain readers copy it out without touching `lock`,
//!   so a poll never waits behind a join (read-committed).
//!
//! Rooms never share a row lock, so operations on different rooms never
//! wait for each other.
//!
//! # Lock ordering
//!
//! Commit takes the room map, then the user table, then individual
//! `committed` cells. Nothing else holds two of these at once, so there
//! is no cycle.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tempo_protocol::{RoomId, RoomStatus, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;

use crate::{
    NewRoom, NewUser, RoomFilter, RoomRow, Store, StoreError, Transaction,
    UserRow,
};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct RoomSlot {
    lock: Arc<Mutex<()>>,
    /// `None` once the room was deleted. A transaction that was waiting on
    /// `lock` while the delete committed sees this and reports "not found".
    committed: RwLock<Option<RoomRow>>,
}

impl RoomSlot {
    fn new(row: RoomRow) -> Self {
        Self {
            lock: Arc::new(Mutex::new(())),
            committed: RwLock::new(Some(row)),
        }
    }
}

#[derive(Default)]
struct UserTable {
    by_id: HashMap<UserId, UserRow>,
    by_token: HashMap<String, UserId>,
}

impl UserTable {
    fn by_token(&self, token: &str) -> Option<&UserRow> {
        self.by_token.get(token).and_then(|id| self.by_id.get(id))
    }

    fn apply(&mut self, write: UserWrite) {
        match write {
            UserWrite::Insert(row) => {
                self.by_token.insert(row.token.clone(), row.id);
                self.by_id.insert(row.id, row);
            }
            UserWrite::Profile {
                user_id,
                name,
                leader_card_id,
            } => {
                if let Some(row) = self.by_id.get_mut(&user_id) {
                    row.name = name;
                    row.leader_card_id = leader_card_id;
                }
            }
            UserWrite::Room { user_id, room_id } => {
                if let Some(row) = self.by_id.get_mut(&user_id) {
                    row.room_id = room_id;
                }
            }
            UserWrite::LeaveRoom { user_id, room_id } => {
                if let Some(row) = self.by_id.get_mut(&user_id) {
                    if row.room_id == Some(room_id) {
                        row.room_id = None;
                    }
                }
            }
        }
    }
}

struct Inner {
    rooms: RwLock<HashMap<RoomId, Arc<RoomSlot>>>,
    users: RwLock<UserTable>,
    next_room_id: AtomicU64,
    next_user_id: AtomicU64,
}

impl Inner {
    async fn slot(&self, room_id: RoomId) -> Option<Arc<RoomSlot>> {
        self.rooms.read().await.get(&room_id).cloned()
    }

    async fn snapshot(&self, room_id: RoomId) -> Option<RoomRow> {
        let slot = self.slot(room_id).await?;
        let row = slot.committed.read().await.clone();
        row
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-memory [`Store`].
///
/// Cheap to clone: clones share the same tables, like several pool
/// handles to one database.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store. Ids start at 1.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                rooms: RwLock::new(HashMap::new()),
                users: RwLock::new(UserTable::default()),
                next_room_id: AtomicU64::new(1),
                next_user_id: AtomicU64::new(1),
            }),
        }
    }

    /// Returns the number of committed rooms.
    pub async fn room_count(&self) -> usize {
        self.inner.rooms.read().await.len()
    }

    /// Returns the number of committed users.
    pub async fn user_count(&self) -> usize {
        self.inner.users.read().await.by_id.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, StoreError> {
        Ok(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            rooms: HashMap::new(),
            users: Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryTransaction
// ---------------------------------------------------------------------------

/// A room row this transaction has locked or inserted.
struct StagedRoom {
    /// `None` for rooms inserted by this transaction: nobody else can see
    /// them yet, so there is nothing to lock.
    slot: Option<Arc<RoomSlot>>,
    guard: Option<OwnedMutexGuard<()>>,
    /// Current version as this transaction sees it; `None` once deleted.
    row: Option<RoomRow>,
    dirty: bool,
}

enum UserWrite {
    Insert(UserRow),
    Profile {
        user_id: UserId,
        name: String,
        leader_card_id: u32,
    },
    Room {
        user_id: UserId,
        room_id: Option<RoomId>,
    },
    /// Clear the reference if it still points at `room_id`.
    LeaveRoom {
        user_id: UserId,
        room_id: RoomId,
    },
}

/// A unit of work against a [`MemoryStore`].
///
/// Writes are staged locally and applied in one step by `commit`.
pub struct MemoryTransaction {
    inner: Arc<Inner>,
    rooms: HashMap<RoomId, StagedRoom>,
    users: Vec<UserWrite>,
}

impl MemoryTransaction {
    fn staged_token_taken(&self, token: &str) -> bool {
        self.users
            .iter()
            .any(|w| matches!(w, UserWrite::Insert(row) if row.token == token))
    }

    /// Replays this transaction's staged user writes on top of `row`.
    fn overlay(&self, mut row: UserRow) -> UserRow {
        for write in &self.users {
            match write {
                UserWrite::Profile {
                    user_id,
                    name,
                    leader_card_id,
                } if *user_id == row.id => {
                    row.name = name.clone();
                    row.leader_card_id = *leader_card_id;
                }
                UserWrite::Room { user_id, room_id } if *user_id == row.id => {
                    row.room_id = *room_id;
                }
                UserWrite::LeaveRoom { user_id, room_id }
                    if *user_id == row.id && row.room_id == Some(*room_id) =>
                {
                    row.room_id = None;
                }
                _ => {}
            }
        }
        row
    }

    fn locked_row(&mut self, room_id: RoomId) -> Result<&mut StagedRoom, StoreError> {
        match self.rooms.get_mut(&room_id) {
            Some(staged) if staged.row.is_some() => Ok(staged),
            _ => Err(StoreError::NotLocked(room_id)),
        }
    }
}

impl Transaction for MemoryTransaction {
    async fn insert_user(&mut self, user: NewUser) -> Result<UserId, StoreError> {
        let taken = self.inner.users.read().await.by_token(&user.token).is_some();
        if taken || self.staged_token_taken(&user.token) {
            return Err(StoreError::UniqueViolation { field: "token" });
        }

        let id = UserId(self.inner.next_user_id.fetch_add(1, Ordering::Relaxed));
        self.users.push(UserWrite::Insert(UserRow {
            id,
            name: user.name,
            leader_card_id: user.leader_card_id,
            token: user.token,
            room_id: None,
        }));
        Ok(id)
    }

    async fn user_by_token(&mut self, token: &str) -> Result<Option<UserRow>, StoreError> {
        let staged = self.users.iter().find_map(|w| match w {
            UserWrite::Insert(row) if row.token == token => Some(row.clone()),
            _ => None,
        });
        let row = match staged {
            Some(row) => Some(row),
            None => self.inner.users.read().await.by_token(token).cloned(),
        };
        Ok(row.map(|row| self.overlay(row)))
    }

    async fn update_user(
        &mut self,
        token: &str,
        name: &str,
        leader_card_id: u32,
    ) -> Result<bool, StoreError> {
        let Some(user) = self.user_by_token(token).await? else {
            return Ok(false);
        };
        self.users.push(UserWrite::Profile {
            user_id: user.id,
            name: name.to_string(),
            leader_card_id,
        });
        Ok(true)
    }

    async fn set_user_room(
        &mut self,
        user_id: UserId,
        room_id: Option<RoomId>,
    ) -> Result<(), StoreError> {
        self.users.push(UserWrite::Room { user_id, room_id });
        Ok(())
    }

    async fn clear_user_room(
        &mut self,
        user_id: UserId,
        room_id: RoomId,
    ) -> Result<(), StoreError> {
        self.users.push(UserWrite::LeaveRoom { user_id, room_id });
        Ok(())
    }

    async fn insert_room(&mut self, room: NewRoom) -> Result<RoomId, StoreError> {
        let room_id = RoomId(self.inner.next_room_id.fetch_add(1, Ordering::Relaxed));
        let row = RoomRow {
            room_id,
            live_id: room.live_id,
            host_user_id: room.host_user_id,
            status: RoomStatus::Waiting,
            joined_user_count: room.joined_user_count,
            max_user_count: room.max_user_count,
            completed_result_count: 0,
            members: room.members,
            created_at: room.created_at,
            play_started_at: None,
        };
        self.rooms.insert(
            room_id,
            StagedRoom {
                slot: None,
                guard: None,
                row: Some(row),
                dirty: true,
            },
        );
        Ok(room_id)
    }

    async fn room(&mut self, room_id: RoomId) -> Result<Option<RoomRow>, StoreError> {
        if let Some(staged) = self.rooms.get(&room_id) {
            return Ok(staged.row.clone());
        }
        Ok(self.inner.snapshot(room_id).await)
    }

    async fn room_for_update(&mut self, room_id: RoomId) -> Result<Option<RoomRow>, StoreError> {
        if let Some(staged) = self.rooms.get(&room_id) {
            return Ok(staged.row.clone());
        }

        let Some(slot) = self.inner.slot(room_id).await else {
            return Ok(None);
        };
        let guard = Arc::clone(&slot.lock).lock_owned().await;
        let row = slot.committed.read().await.clone();
        let Some(row) = row else {
            // Deleted while we waited for the lock.
            return Ok(None);
        };

        self.rooms.insert(
            room_id,
            StagedRoom {
                slot: Some(slot),
                guard: Some(guard),
                row: Some(row.clone()),
                dirty: false,
            },
        );
        Ok(Some(row))
    }

    async fn update_room(&mut self, row: RoomRow) -> Result<(), StoreError> {
        let staged = self.locked_row(row.room_id)?;
        staged.row = Some(row);
        staged.dirty = true;
        Ok(())
    }

    async fn start_room(
        &mut self,
        room_id: RoomId,
        host: UserId,
        at: Instant,
    ) -> Result<bool, StoreError> {
        let Some(mut row) = self.room_for_update(room_id).await? else {
            return Ok(false);
        };
        if row.host_user_id != host || row.status != RoomStatus::Waiting {
            return Ok(false);
        }
        row.status = RoomStatus::Playing;
        row.play_started_at = Some(at);
        self.update_room(row).await?;
        Ok(true)
    }

    async fn delete_room(&mut self, room_id: RoomId) -> Result<(), StoreError> {
        let staged = self.locked_row(room_id)?;
        staged.row = None;
        staged.dirty = true;
        Ok(())
    }

    async fn open_rooms(&mut self, filter: &RoomFilter) -> Result<Vec<RoomRow>, StoreError> {
        let rooms = self.inner.rooms.read().await;
        let mut open = Vec::new();
        for slot in rooms.values() {
            if let Some(row) = slot.committed.read().await.as_ref() {
                if filter.matches(row) {
                    open.push(row.clone());
                }
            }
        }
        open.sort_by_key(|row| row.room_id);
        Ok(open)
    }

    async fn commit(self) -> Result<(), StoreError> {
        let MemoryTransaction {
            inner,
            rooms: staged_rooms,
            users: staged_users,
        } = self;

        let mut rooms = inner.rooms.write().await;
        let mut users = inner.users.write().await;

        // Validate before applying anything, so a late collision leaves
        // the store exactly as it was.
        for write in &staged_users {
            if let UserWrite::Insert(row) = write {
                if users.by_token.contains_key(&row.token) {
                    return Err(StoreError::UniqueViolation { field: "token" });
                }
            }
        }

        // Row locks are released only after every write is in place.
        let mut guards = Vec::with_capacity(staged_rooms.len());
        for (room_id, staged) in staged_rooms {
            guards.push(staged.guard);
            if !staged.dirty {
                continue;
            }
            match (staged.slot, staged.row) {
                (Some(slot), row) => {
                    let deleted = row.is_none();
                    *slot.committed.write().await = row;
                    if deleted {
                        rooms.remove(&room_id);
                    }
                }
                (None, Some(row)) => {
                    rooms.insert(room_id, Arc::new(RoomSlot::new(row)));
                }
                // Inserted and deleted within this transaction.
                (None, None) => {}
            }
        }

        for write in staged_users {
            users.apply(write);
        }

        drop(users);
        drop(rooms);
        drop(guards);
        tracing::trace!("transaction committed");
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
