//! The identity resolver: issues users and maps tokens back to them.

use std::sync::Arc;

use tempo_protocol::{RoomId, SafeUser, UserId};
use tempo_store::{NewUser, Store, StoreError, Transaction, UserRow};

use crate::{RandomTokens, SessionError, TokenSource};

/// Who a token belongs to, and where they were last placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: SafeUser,
    /// The user's current-room reference. It may point at a room that has
    /// since been deleted.
    pub room_id: Option<RoomId>,
}

impl Identity {
    /// Shorthand for `self.user.id`.
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

impl From<UserRow> for Identity {
    fn from(row: UserRow) -> Self {
        Self {
            user: SafeUser {
                id: row.id,
                name: row.name,
                leader_card_id: row.leader_card_id,
            },
            room_id: row.room_id,
        }
    }
}

/// Resolves `token` inside an open transaction.
///
/// Room operations call this first, so an unknown token fails the whole
/// operation before anything was staged.
///
/// # Errors
/// [`SessionError::InvalidToken`] if no user holds `token`.
pub async fn authenticate<T: Transaction>(
    tx: &mut T,
    token: &str,
) -> Result<Identity, SessionError> {
    tx.user_by_token(token)
        .await?
        .map(Identity::from)
        .ok_or(SessionError::InvalidToken)
}

/// Issues identities and resolves bearer tokens against a [`Store`].
pub struct IdentityResolver<S> {
    store: Arc<S>,
    tokens: Arc<dyn TokenSource>,
}

impl<S> Clone for IdentityResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<S: Store> IdentityResolver<S> {
    /// Creates a resolver that issues [`RandomTokens`].
    pub fn new(store: Arc<S>) -> Self {
        Self::with_tokens(store, Arc::new(RandomTokens))
    }

    /// Creates a resolver that draws tokens from `tokens`.
    pub fn with_tokens(store: Arc<S>, tokens: Arc<dyn TokenSource>) -> Self {
        Self { store, tokens }
    }

    /// Registers a user and returns their bearer token.
    ///
    /// Each attempt is one insert in its own transaction. A token that
    /// collides with an existing user is discarded and a new one drawn,
    /// for as long as it takes.
    ///
    /// # Errors
    /// Any store failure other than a token collision.
    pub async fn create_user(
        &self,
        name: &str,
        leader_card_id: u32,
    ) -> Result<String, SessionError> {
        loop {
            let token = self.tokens.generate();
            match self.try_insert(name, leader_card_id, &token).await {
                Ok(user_id) => {
                    tracing::info!(%user_id, "user created");
                    return Ok(token);
                }
                Err(StoreError::UniqueViolation { field }) => {
                    tracing::debug!(field, "token collision, drawing again");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn try_insert(
        &self,
        name: &str,
        leader_card_id: u32,
        token: &str,
    ) -> Result<UserId, StoreError> {
        let mut tx = self.store.begin().await?;
        let user_id = tx
            .insert_user(NewUser {
                name: name.to_string(),
                leader_card_id,
                token: token.to_string(),
            })
            .await?;
        tx.commit().await?;
        Ok(user_id)
    }

    /// Looks up the user holding `token`. `None` if nobody does.
    pub async fn resolve(&self, token: &str) -> Result<Option<Identity>, SessionError> {
        let mut tx = self.store.begin().await?;
        let row = tx.user_by_token(token).await?;
        Ok(row.map(Identity::from))
    }

    /// Like [`resolve`](Self::resolve), but an unknown token is an error.
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`] if no user holds `token`.
    pub async fn me(&self, token: &str) -> Result<SafeUser, SessionError> {
        self.resolve(token)
            .await?
            .map(|identity| identity.user)
            .ok_or(SessionError::InvalidToken)
    }

    /// Replaces name and leader card of the user holding `token`.
    ///
    /// An unknown token matches no row and changes nothing.
    pub async fn update_profile(
        &self,
        token: &str,
        name: &str,
        leader_card_id: u32,
    ) -> Result<(), SessionError> {
        let mut tx = self.store.begin().await?;
        if tx.update_user(token, name, leader_card_id).await? {
            tx.commit().await?;
        } else {
            tracing::debug!("profile update for unknown token ignored");
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tempo_store::MemoryStore;

    use super::*;

    fn resolver() -> (IdentityResolver<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        (IdentityResolver::new(Arc::new(store.clone())), store)
    }

    /// A token source that hands out `tokens` in order.
    fn scripted(tokens: &[&str]) -> Arc<dyn TokenSource> {
        let queue: Mutex<VecDeque<String>> =
            Mutex::new(tokens.iter().map(|t| t.to_string()).collect());
        Arc::new(move || queue.lock().unwrap().pop_front().unwrap())
    }

    #[tokio::test]
    async fn test_create_user_then_resolve_returns_identity() {
        let (ids, _) = resolver();
        let token = ids.create_user("kana", 7).await.unwrap();

        let identity = ids.resolve(&token).await.unwrap().unwrap();

        assert_eq!(identity.user.name, "kana");
        assert_eq!(identity.user.leader_card_id, 7);
        assert_eq!(identity.room_id, None);
    }

    #[tokio::test]
    async fn test_create_user_twice_gets_distinct_ids_and_tokens() {
        let (ids, _) = resolver();
        let a = ids.create_user("a", 1).await.unwrap();
        let b = ids.create_user("b", 1).await.unwrap();

        assert_ne!(a, b);
        let a = ids.resolve(&a).await.unwrap().unwrap();
        let b = ids.resolve(&b).await.unwrap().unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_create_user_collision_draws_again() {
        let store = Arc::new(MemoryStore::new());
        let ids = IdentityResolver::with_tokens(
            Arc::clone(&store),
            scripted(&["dup", "dup", "dup", "fresh"]),
        );

        assert_eq!(ids.create_user("first", 1).await.unwrap(), "dup");
        assert_eq!(ids.create_user("second", 2).await.unwrap(), "fresh");
        assert_eq!(store.user_count().await, 2);

        let second = ids.resolve("fresh").await.unwrap().unwrap();
        assert_eq!(second.user.name, "second");
    }

    #[tokio::test]
    async fn test_resolve_unknown_token_returns_none() {
        let (ids, _) = resolver();
        assert!(ids.resolve("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_me_unknown_token_returns_invalid_token() {
        let (ids, _) = resolver();
        let result = ids.me("nobody").await;
        assert!(matches!(result, Err(SessionError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_update_profile_changes_name_and_card() {
        let (ids, _) = resolver();
        let token = ids.create_user("old", 1).await.unwrap();

        ids.update_profile(&token, "new", 42).await.unwrap();

        let me = ids.me(&token).await.unwrap();
        assert_eq!(me.name, "new");
        assert_eq!(me.leader_card_id, 42);
    }

    #[tokio::test]
    async fn test_update_profile_unknown_token_is_noop() {
        let (ids, store) = resolver();
        ids.create_user("kana", 1).await.unwrap();

        ids.update_profile("nobody", "x", 9).await.unwrap();

        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token_fails_inside_transaction() {
        let (_, store) = resolver();
        let mut tx = store.begin().await.unwrap();
        let result = authenticate(&mut tx, "nobody").await;
        assert!(matches!(result, Err(SessionError::InvalidToken)));
    }
}
