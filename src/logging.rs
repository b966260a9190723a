//! Logging initialization.
//!
//! Logs go to stderr so stdout stays clean for the rendered DOM.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `--verbose` raises the default level to DEBUG (renderer stdout/stderr
/// included); `RUST_LOG` overrides both.
pub fn initialize_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
