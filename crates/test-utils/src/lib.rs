pub mod builders;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a tracing subscriber for the test binary. Idempotent, so every
/// test can call it unconditionally.
///
/// Output goes through the test writer: it shows up for failing tests only,
/// unless the harness runs with `--nocapture`. Filter with `RUST_LOG`, e.g.
/// `RUST_LOG=lakebench=debug cargo test`.
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

/// Bound a future so a scheduling bug fails the test instead of hanging the
/// whole run. Five seconds is generous for the in-memory backend.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("future did not finish within 5 seconds")
}
