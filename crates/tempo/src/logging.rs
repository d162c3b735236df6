//! Log output for binaries built on Tempo.
//!
//! Library code only emits `tracing` events; installing a subscriber is
//! the binary's call. These helpers install the usual one: formatted
//! output on stderr, filtered by `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;

/// Installs the global subscriber. Does nothing if one is already set.
pub fn init() {
    if try_init().is_err() {
        tracing::debug!("global subscriber already installed");
    }
}

/// Installs the global subscriber.
///
/// # Errors
/// Fails if a global subscriber was already installed.
pub fn try_init() -> Result<(), TryInitError> {
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .finish()
        .try_init()
}
