//! pipegraph-cli library: load, validate and run pipeline definitions from JSON files.
//!
//! Reads retry settings from env / .env, compiles the definition with the builtin node
//! kinds and runs it, returns final state.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), pipegraph_cli::Error> {
//! let state = pipegraph_cli::run_file("bot.json".as_ref(), "I need a refund").await?;
//! println!("{}", state.input_text());
//! # Ok(())
//! # }
//! ```

mod args;
mod config;
mod logging;
mod run;

pub use args::{Cli, Command, RunArgs};
pub use config::{
    Error, RunConfig, RunOptions, ENV_BACKOFF_FACTOR, ENV_INITIAL_INTERVAL_MS, ENV_JITTER,
    ENV_MAX_ATTEMPTS, ENV_MAX_INTERVAL_MS,
};
pub use logging::init_tracing;
pub use pipegraph::PipelineState;
pub use run::{
    compile_definition, initial_state, load_definition, run_file, run_with_config,
    run_with_options, stream_with_config, validate_file, ValidationSummary,
};

#[cfg(test)]
mod tests;
