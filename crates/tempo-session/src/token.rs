//! Bearer token generation.
//!
//! Tokens are opaque to everything above the store: a client presents one
//! with every request and the store maps it back to a user. The only
//! requirement is that they are hard to guess. Uniqueness is enforced by
//! the store, not here; [`IdentityResolver`](crate::IdentityResolver)
//! simply draws again on a collision.

use rand::Rng;

/// Produces candidate bearer tokens.
///
/// Any `Fn() -> String` closure is a `TokenSource`, which keeps tests
/// short:
///
/// ```rust
/// use tempo_session::TokenSource;
///
/// let fixed = || "always-the-same".to_string();
/// assert_eq!(fixed.generate(), "always-the-same");
/// ```
pub trait TokenSource: Send + Sync + 'static {
    /// Returns a new candidate token.
    fn generate(&self) -> String;
}

impl<F> TokenSource for F
where
    F: Fn() -> String + Send + Sync + 'static,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Random 32-character hex tokens (128 bits of entropy).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn generate(&self) -> String {
        let bytes: [u8; 16] = rand::rng().random();
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_tokens_are_32_lowercase_hex_chars() {
        let token = RandomTokens.generate();
        assert_eq!(token.len(), 32);
        assert!(
            token.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "unexpected character in {token}"
        );
    }

    #[test]
    fn test_random_tokens_differ_between_calls() {
        assert_ne!(RandomTokens.generate(), RandomTokens.generate());
    }
}
