//! Tracing subscriber configuration.
//!
//! Log levels follow these conventions:
//! - ERROR: a listener could not start, receive failures
//! - WARN: frames dropped for malformed headers, expired TTL or failed sends
//! - INFO: startup and shutdown, listener lifecycle
//! - DEBUG: per-frame events (received, forwarded, no route)
//! - TRACE: egress details for every transmitted frame

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingSection};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(logging: &LoggingSection) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    match logging.format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

/// Initialize the tracing subscriber for tests.
///
/// Uses `try_init` to avoid panicking if called multiple times.
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
