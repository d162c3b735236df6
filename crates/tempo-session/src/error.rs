//! Error types for the session layer.

use tempo_store::StoreError;

/// Errors that can occur while issuing or resolving identities.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The bearer token doesn't belong to any user.
    /// Raised before the calling operation has any side effect.
    #[error("invalid token")]
    InvalidToken,

    /// The storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
