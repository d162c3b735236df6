//! User identity for Tempo.
//!
//! Every operation starts by turning an opaque bearer token into a user.
//! This crate owns that step:
//!
//! 1. **Issuing identities**: [`IdentityResolver::create_user`] stores a
//!    new user under a freshly generated token ([`TokenSource`]).
//! 2. **Resolving tokens**: [`IdentityResolver::resolve`] for callers that
//!    only read, [`authenticate`] for operations that already hold a
//!    transaction and must fail before any side effect.
//! 3. **Profile edits**: [`IdentityResolver::update_profile`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (above)     ← authenticates inside its own transactions
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Store Layer (below)    ← users table, token uniqueness
//! ```

mod error;
mod identity;
mod token;

pub use error::SessionError;
pub use identity::{Identity, IdentityResolver, authenticate};
pub use token::{RandomTokens, TokenSource};
