pub mod builders;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use procwatch::proc::SuperviseOptions;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Uses `with_test_writer()` so output is captured per-test and only shown
/// for failing tests (or with `-- --nocapture`). Pick a level with
/// `RUST_LOG=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Supervision options suited to tests: nothing printed, everything kept,
/// a fast poll interval, and no auto-start so batch semantics stay
/// observable.
pub fn quiet_options(id: &str) -> SuperviseOptions {
    SuperviseOptions::new()
        .id(id)
        .print_stdout(false)
        .print_stderr(false)
        .keep_stdout(true)
        .keep_stderr(true)
        .auto_start(false)
        .poll_interval(Duration::from_millis(10))
}
