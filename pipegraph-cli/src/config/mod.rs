//! Configuration types for running pipeline definitions.
//!
//! Re-exports [`RunConfig`], [`RunOptions`] and config [`Error`].

mod run_config;
mod run_options;

pub use run_config::{
    Error, RunConfig, ENV_BACKOFF_FACTOR, ENV_INITIAL_INTERVAL_MS, ENV_JITTER, ENV_MAX_ATTEMPTS,
    ENV_MAX_INTERVAL_MS,
};
pub use run_options::RunOptions;
