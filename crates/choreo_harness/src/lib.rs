//! Choreo Test Harness
//!
//! Deterministic infrastructure for driving the scroll engine without a
//! real document or frame clock:
//!
//! - [`HarnessHost`] - in-memory `ScrollHost` with scripted element
//!   geometry, explicit scroll/resize delivery, and a manual frame pump
//! - [`init_test_logging`] - opt-in tracing output for test runs

mod host;

pub use host::HarnessHost;

/// Install a tracing subscriber for test output.
///
/// Reads `RUST_LOG` for filtering; safe to call from multiple tests (only
/// the first registration wins).
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
