//! Run config: retry settings and output flags. Can be filled from env / .env.
//!
//! Converted to a pipegraph [`RetryPolicy`] by [`RunConfig::retry_policy`].

use std::str::FromStr;
use std::time::Duration;

use pipegraph::RetryPolicy;

use super::RunOptions;

/// Error type used for config loading and runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub const ENV_MAX_ATTEMPTS: &str = "PIPEGRAPH_MAX_ATTEMPTS";
pub const ENV_INITIAL_INTERVAL_MS: &str = "PIPEGRAPH_INITIAL_INTERVAL_MS";
pub const ENV_BACKOFF_FACTOR: &str = "PIPEGRAPH_BACKOFF_FACTOR";
pub const ENV_MAX_INTERVAL_MS: &str = "PIPEGRAPH_MAX_INTERVAL_MS";
pub const ENV_JITTER: &str = "PIPEGRAPH_JITTER";

/// Run config: pipeline-wide retry settings plus CLI output flags.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Attempts per node call, including the first. Default: 3.
    pub max_attempts: u32,
    /// Delay before the second attempt. Default: 500 ms.
    pub initial_interval_ms: u64,
    /// Growth factor between delays. Default: 2.0.
    pub backoff_factor: f64,
    /// Upper bound for one delay. Default: 128 s.
    pub max_interval_ms: u64,
    /// Scale each delay by a random factor in [0.5, 1.5]. Default: true.
    pub jitter: bool,
    /// When true, print node updates and router decisions to stderr while running.
    pub stream: bool,
    /// When true, show debug logs. Requires --verbose.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_interval_ms: policy.initial_interval.as_millis() as u64,
            backoff_factor: policy.backoff_factor,
            max_interval_ms: policy.max_interval.as_millis() as u64,
            jitter: policy.jitter,
            stream: false,
            verbose: false,
        }
    }
}

fn env_value<T: FromStr>(name: &str) -> Result<Option<T>, Error> {
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has an invalid value: {:?}", name, raw),
            )
            .into()
        }),
        Err(_) => Ok(None),
    }
}

fn env_flag(name: &str) -> Result<Option<bool>, Error> {
    let Some(raw) = env_value::<String>(name)? else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} must be true or false, got {:?}", name, raw),
        )
        .into()),
    }
}

impl RunConfig {
    /// Fill config from env vars (and .env). Call `dotenv::dotenv().ok()` first, or use
    /// [`run_file`](crate::run_file) which does.
    ///
    /// All variables are optional: `PIPEGRAPH_MAX_ATTEMPTS`, `PIPEGRAPH_INITIAL_INTERVAL_MS`,
    /// `PIPEGRAPH_BACKOFF_FACTOR`, `PIPEGRAPH_MAX_INTERVAL_MS`, `PIPEGRAPH_JITTER`.
    /// A set but unparsable value is an error naming the variable.
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Self::default();
        Ok(Self {
            max_attempts: env_value(ENV_MAX_ATTEMPTS)?.unwrap_or(defaults.max_attempts),
            initial_interval_ms: env_value(ENV_INITIAL_INTERVAL_MS)?
                .unwrap_or(defaults.initial_interval_ms),
            backoff_factor: env_value(ENV_BACKOFF_FACTOR)?.unwrap_or(defaults.backoff_factor),
            max_interval_ms: env_value(ENV_MAX_INTERVAL_MS)?.unwrap_or(defaults.max_interval_ms),
            jitter: env_flag(ENV_JITTER)?.unwrap_or(defaults.jitter),
            ..defaults
        })
    }

    /// Apply optional overrides from `RunOptions` to this config.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(n) = options.max_attempts {
            self.max_attempts = n;
        }
        if let Some(ms) = options.initial_interval_ms {
            self.initial_interval_ms = ms;
        }
        if options.no_retry {
            self.max_attempts = 1;
        }
        if options.no_jitter {
            self.jitter = false;
        }
        if options.stream {
            self.stream = true;
        }
        self.verbose = options.verbose;
    }

    /// Pipeline-wide retry policy; retries rate-limited node errors only.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(self.max_attempts)
            .with_initial_interval(Duration::from_millis(self.initial_interval_ms))
            .with_backoff_factor(self.backoff_factor)
            .with_max_interval(Duration::from_millis(self.max_interval_ms))
            .with_jitter(self.jitter)
    }
}
