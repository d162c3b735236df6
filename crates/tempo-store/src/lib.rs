//! Storage seam for Tempo.
//!
//! Tempo does not own a database. It needs a collaborator that offers:
//!
//! 1. **Atomic units of work**: [`Store::begin`] hands out a
//!    [`Transaction`]; nothing it stages is visible until
//!    [`Transaction::commit`], and dropping it rolls everything back.
//! 2. **Row-level exclusive locks**: [`Transaction::room_for_update`]
//!    ("select for update") serializes every mutation of one room while
//!    leaving other rooms untouched.
//! 3. **Uniqueness signaling**: [`StoreError::UniqueViolation`] tells the
//!    identity layer a generated token collided.
//!
//! [`MemoryStore`] implements all three in process. A SQL-backed store
//! implements the same traits against real tables.

mod error;
mod memory;
mod row;
mod store;

pub use error::StoreError;
pub use memory::{MemoryStore, MemoryTransaction};
pub use row::{NewRoom, NewUser, RoomFilter, RoomRow, UserRow};
pub use store::{Store, Transaction};
