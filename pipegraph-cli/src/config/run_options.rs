//! Optional overrides for a run (CLI args or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options) and
//! [`run_with_options`](crate::run_with_options).

/// Optional overrides for a run. Only set fields override the base config (from env).
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Override max attempts per node.
    pub max_attempts: Option<u32>,
    /// Override the first backoff delay, in milliseconds.
    pub initial_interval_ms: Option<u64>,
    /// Single attempt per node; wins over `max_attempts`.
    pub no_retry: bool,
    /// Disable backoff jitter.
    pub no_jitter: bool,
    /// Print node updates and router decisions to stderr while running.
    pub stream: bool,
    /// Debug-level logs (node start/complete, retries, routes).
    pub verbose: bool,
}
