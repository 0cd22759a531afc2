//! Unit tests for pipegraph-cli, organized by module.
//!
//! Tests are BDD-style with Given/When/Then comments and descriptive names.
//! Tests that touch `PIPEGRAPH_*` env vars take [`env_lock`] so they run serially.

use std::sync::{Mutex, MutexGuard, OnceLock};


static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sets `vars` (None = unset) for the guard's lifetime, restoring previous values on drop.
pub(crate) struct EnvVars {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvVars {
    pub(crate) fn set(vars: &[(&'static str, Option<&str>)]) -> Self {
        let saved = vars
            .iter()
            .map(|(name, value)| {
                let previous = std::env::var(name).ok();
                match value {
                    Some(v) => std::env::set_var(name, v),
                    None => std::env::remove_var(name),
                }
                (*name, previous)
            })
            .collect();
        Self { saved }
    }
}

impl Drop for EnvVars {
    fn drop(&mut self) {
        for (name, previous) in &self.saved {
            match previous {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
    }
}
