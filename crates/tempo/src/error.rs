//! Unified error type for Tempo.

use tempo_room::RoomError;
use tempo_session::SessionError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TempoError {
    /// An identity error (invalid token, store failure while resolving).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room error (invalid token, missing room, store failure).
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl TempoError {
    /// Returns `true` if the caller's token didn't resolve, whichever
    /// layer noticed.
    pub fn is_invalid_token(&self) -> bool {
        match self {
            Self::Session(e) => matches!(e, SessionError::InvalidToken),
            Self::Room(e) => e.is_invalid_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempo_protocol::RoomId;
    use tempo_store::StoreError;

    use super::*;

    #[test]
    fn test_from_session_error() {
        let err: TempoError = SessionError::InvalidToken.into();
        assert!(matches!(err, TempoError::Session(_)));
        assert!(err.is_invalid_token());
        assert_eq!(err.to_string(), "invalid token");
    }

    #[test]
    fn test_from_room_error_wrapping_invalid_token() {
        let err: TempoError = RoomError::from(SessionError::InvalidToken).into();
        assert!(matches!(err, TempoError::Room(_)));
        assert!(err.is_invalid_token());
    }

    #[test]
    fn test_room_not_found_is_not_invalid_token() {
        let err: TempoError = RoomError::NotFound(RoomId(4)).into();
        assert!(!err.is_invalid_token());
        assert!(err.to_string().contains("R-4"));
    }

    #[test]
    fn test_store_error_message_passes_through() {
        let err: TempoError =
            SessionError::from(StoreError::UniqueViolation { field: "token" }).into();
        assert_eq!(err.to_string(), "unique constraint violated on token");
    }
}
