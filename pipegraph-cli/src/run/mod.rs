//! Run entry points: load a definition file, validate it, run it with config from env.
//!
//! Re-exports [`run_with_config`], [`load_definition`] and [`Error`].

pub use crate::config::Error;

mod run_with_config;

use std::path::Path;

use pipegraph::{CompiledPipeline, NodeRegistry, PipelineDefinition, PipelineState};

use crate::config::{RunConfig, RunOptions};

pub use run_with_config::{run_with_config, stream_with_config};

/// Reads and parses a JSON pipeline definition.
pub fn load_definition(path: &Path) -> Result<PipelineDefinition, Error> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(PipelineDefinition::from_json(&text)?)
}

/// Compiles `definition` with the builtin node kinds and the retry policy from `config`.
pub fn compile_definition(
    definition: &PipelineDefinition,
    config: &RunConfig,
) -> Result<CompiledPipeline, Error> {
    let registry = NodeRegistry::with_builtins();
    Ok(definition.compile(&registry, config.retry_policy())?)
}

/// Summary of a valid definition, printed by `pipegraph validate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationSummary {
    pub start: String,
    pub end: String,
    pub node_count: usize,
    /// Router ids with their condition labels, in definition order.
    pub routers: Vec<(String, Vec<String>)>,
}

impl std::fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "ok: {} nodes, {} -> {}",
            self.node_count, self.start, self.end
        )?;
        for (router, conditions) in &self.routers {
            writeln!(f, "router {}: {}", router, conditions.join(", "))?;
        }
        Ok(())
    }
}

/// Loads and compiles the definition at `path` without running it.
pub fn validate_file(path: &Path) -> Result<ValidationSummary, Error> {
    let definition = load_definition(path)?;
    let compiled = compile_definition(&definition, &RunConfig::default())?;
    let routers = definition
        .nodes
        .iter()
        .filter_map(|spec| {
            compiled.route_table(&spec.id).map(|table| {
                (
                    spec.id.clone(),
                    table.conditions().map(str::to_string).collect(),
                )
            })
        })
        .collect();
    Ok(ValidationSummary {
        start: compiled.start_id().to_string(),
        end: compiled.end_id().to_string(),
        node_count: compiled.node_count(),
        routers,
    })
}

/// Initial state for a run: `input` as `last_node_output`, plus the keys of `extra`
/// (a JSON object) when given.
pub fn initial_state(input: &str, extra: Option<&str>) -> Result<PipelineState, Error> {
    let mut state = PipelineState::from_input(input);
    if let Some(extra) = extra {
        let value: serde_json::Value = serde_json::from_str(extra)?;
        let serde_json::Value::Object(map) = value else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "--state must be a JSON object",
            )
            .into());
        };
        for (key, value) in map {
            state.insert(key, value);
        }
    }
    Ok(state)
}

/// Loads `.env`, builds `RunConfig` from env, applies `options`, then runs the definition
/// at `path` with `state`.
pub async fn run_with_options(
    path: &Path,
    state: PipelineState,
    options: &RunOptions,
) -> Result<PipelineState, Error> {
    dotenv::dotenv().ok();
    let mut config = RunConfig::from_env()?;
    config.apply_options(options);
    let definition = load_definition(path)?;
    if config.stream {
        stream_with_config(&config, &definition, state).await
    } else {
        run_with_config(&config, &definition, state).await
    }
}

/// Runs the definition at `path` with `input` and config from env / .env.
pub async fn run_file(path: &Path, input: &str) -> Result<PipelineState, Error> {
    run_with_options(path, PipelineState::from_input(input), &RunOptions::default()).await
}
