//! Room coordination for Tempo.
//!
//! A room is one lobby for one live: players join, pick a difficulty,
//! the host starts the live, everybody plays and reports a score, and
//! the room dissolves. Every mutation runs inside a single store
//! transaction that holds the room's row lock, so concurrent joins,
//! leaves and submissions on one room serialize while other rooms are
//! untouched.
//!
//! # Key types
//!
//! - [`RoomManager`]: every room operation (registry, membership,
//!   lifecycle, results)
//! - [`RoomConfig`]: capacity and the three staleness windows
//! - [`Roster`] / [`Member`]: the member list stored with each room
//! - [`spawn_sweeper`]: optional background auto-start

mod config;
mod error;
mod lifecycle;
mod manager;
mod membership;
mod registry;
mod results;
mod roster;
mod sweep;

pub use config::{RoomConfig, SweepConfig};
pub use error::RoomError;
pub use manager::RoomManager;
pub use roster::{Member, Roster};
pub use sweep::{MIN_SWEEP_INTERVAL, spawn_sweeper};
