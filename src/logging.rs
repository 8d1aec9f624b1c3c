//! Logging initialization for binaries built on this crate.
//!
//! The library itself only emits `tracing` events; nothing is printed unless a subscriber is installed.

use std::sync::Once;

use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level
    Development,
    /// JSON output at info level
    Production,
    /// No output
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`. Only the first call has an effect.
///
/// `RUST_LOG` overrides the profile's default filter.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = |default: &str| EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        // A subscriber installed elsewhere (e.g. by a test harness) takes precedence
        let _ = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter("bpmn_diff=debug"))
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter("bpmn_diff=info"))
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}
