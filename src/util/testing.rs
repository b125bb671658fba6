//! Shared tracing setup for tests.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();
static USER_CONFIG: Once = Once::new();

/// Install a stderr subscriber once per test binary.
///
/// Honors `RUST_LOG`; falls back to `debug` for this crate.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

/// Hide the developer's own configuration from code that calls
/// `Settings::load`: `XDG_CONFIG_HOME` points at an empty scratch directory
/// and inherited `TERMGRAPH_*` variables are removed.
pub fn isolate_user_config() {
    USER_CONFIG.call_once(|| {
        env::set_var(
            "XDG_CONFIG_HOME",
            env::temp_dir().join("termgraph-test-xdg-config"),
        );
        for (key, _) in env::vars().filter(|(key, _)| key.starts_with("TERMGRAPH_")) {
            env::remove_var(key);
        }
    });
}

fn setup_test_logging() {
    let env_filter = env::var("RUST_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new("termgraph=debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
