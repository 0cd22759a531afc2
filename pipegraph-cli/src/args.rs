//! Command-line arguments of the `pipegraph` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "pipegraph")]
#[command(about = "Validate and run chatbot pipeline definitions")]
pub struct Cli {
    /// Debug logs on stderr (node start/complete, routes, retries)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the pipeline and report errors without running it
    Validate {
        /// Path to the JSON pipeline definition
        definition: PathBuf,
    },
    /// Run the pipeline on one message and print the final state as JSON
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the JSON pipeline definition
    pub definition: PathBuf,

    /// Inbound message (also accepted as trailing positional words)
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Extra initial state keys, as a JSON object
    #[arg(long, value_name = "JSON")]
    pub state: Option<String>,

    /// Attempts per node call (overrides PIPEGRAPH_MAX_ATTEMPTS)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// First backoff delay in ms (overrides PIPEGRAPH_INITIAL_INTERVAL_MS)
    #[arg(long)]
    pub initial_interval_ms: Option<u64>,

    /// One attempt per node
    #[arg(long)]
    pub no_retry: bool,

    /// Disable backoff jitter
    #[arg(long)]
    pub no_jitter: bool,

    /// Print node updates and router decisions while running
    #[arg(long)]
    pub stream: bool,

    /// Print only `last_node_output` instead of the whole state
    #[arg(long)]
    pub output_only: bool,

    #[arg(trailing_var_arg = true)]
    pub rest: Vec<String>,
}

impl RunArgs {
    /// The message from `--message`, else the trailing words, else empty.
    pub fn message(&self) -> String {
        if let Some(ref m) = self.message {
            return m.clone();
        }
        self.rest.join(" ").trim().to_string()
    }

    pub fn run_options(&self, verbose: bool) -> RunOptions {
        RunOptions {
            max_attempts: self.max_attempts,
            initial_interval_ms: self.initial_interval_ms,
            no_retry: self.no_retry,
            no_jitter: self.no_jitter,
            stream: self.stream,
            verbose,
        }
    }
}
