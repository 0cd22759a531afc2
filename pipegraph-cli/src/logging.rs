//! Tracing setup for the binary: logs go to stderr so stdout carries only the result.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,pipegraph=debug,pipegraph_cli=debug"
    } else {
        "warn"
    }
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to [`default_filter`].
///
/// Returns an error when a global subscriber is already set.
pub fn init_tracing(verbose: bool) -> Result<(), crate::Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
