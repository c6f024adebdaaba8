//! Test log capture shared by unit and integration tests.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceCell<()> = OnceCell::new();

const DEFAULT_DIRECTIVES: &str = "warn";

/// Filter directives for test runs: `TEST_LOG`, then `RUST_LOG`, then quiet.
pub fn directives() -> String {
    std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
}

/// Install a plain-text subscriber writing through the test harness.
///
/// Safe to call from every test binary and every `ctor`; only the first call
/// installs anything, and an already-installed global subscriber is left alone.
pub fn init() {
    INSTALLED.get_or_init(|| {
        let filter =
            EnvFilter::try_new(directives()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .with_target(false)
            .try_init()
            .ok();
    });
}
