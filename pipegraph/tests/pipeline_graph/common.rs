//! Shared nodes for pipeline graph integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pipegraph::{Node, NodeError, PipelineState, RetryPolicy};

/// Retry policy without sleeps, for tests.
pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_attempts(max_attempts)
        .with_initial_interval(Duration::ZERO)
        .with_jitter(false)
}

/// Records `"{name}({input})"` as its output.
pub struct AppendNode {
    name: String,
}

impl AppendNode {
    pub fn arc(name: &str) -> Arc<dyn Node> {
        Arc::new(Self {
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl Node for AppendNode {
    async fn run(&self, mut state: PipelineState) -> Result<PipelineState, NodeError> {
        let output = format!("{}({})", self.name, state.input_text());
        state.record_output(&self.name, output);
        Ok(state)
    }
}

/// Passes state through and counts calls.
#[derive(Default)]
pub struct SpyNode {
    pub calls: AtomicU32,
}

impl SpyNode {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Node for SpyNode {
    async fn run(&self, state: PipelineState) -> Result<PipelineState, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(state)
    }
}

/// Fails with `error` for the first `failures` calls (all calls when `None`), then
/// records `"ok"`.
pub struct FlakyNode {
    failures: Option<u32>,
    rate_limited: bool,
    pub calls: AtomicU32,
}

impl FlakyNode {
    /// Rate limited `failures` times, then succeeds.
    pub fn rate_limited(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            failures: Some(failures),
            rate_limited: true,
            calls: AtomicU32::new(0),
        })
    }

    /// Always rate limited.
    pub fn always_rate_limited() -> Arc<Self> {
        Arc::new(Self {
            failures: None,
            rate_limited: true,
            calls: AtomicU32::new(0),
        })
    }

    /// Always fails with a non-retryable error.
    pub fn always_failing() -> Arc<Self> {
        Arc::new(Self {
            failures: None,
            rate_limited: false,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Node for FlakyNode {
    async fn run(&self, mut state: PipelineState) -> Result<PipelineState, NodeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let failing = self.failures.map_or(true, |n| call <= n);
        if failing {
            return Err(if self.rate_limited {
                NodeError::RateLimited(format!("429 on call {}", call))
            } else {
                NodeError::ExecutionFailed("invalid prompt".into())
            });
        }
        state.record_output("flaky", "ok");
        Ok(state)
    }
}
