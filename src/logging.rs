//! Tracing setup for binaries and tests embedding the log.

use tracing_subscriber::{fmt, prelude::*, util::TryInitError, EnvFilter};

fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a compact fmt subscriber. `RUST_LOG` overrides `default_filter`.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(fmt::layer().compact())
        .init();
}

/// Like [`init`], but returns an error instead of panicking when a subscriber
/// is already set. Tests call this repeatedly.
pub fn try_init(default_filter: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(filter(default_filter))
        .with(fmt::layer().compact().with_test_writer())
        .try_init()
}
