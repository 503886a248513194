//! CLI route: single route table and run context.

use crate::algorithm::{ExecutionMode, LazyStructuredVe};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_cycles_json, format_cycles_text, format_models_text, format_solution_json,
    format_solution_text, CycleRow,
};
use crate::config::{ConfigLoader, InferenceConfig};
use crate::demos::{self, DemoModel};
use crate::error::InferenceError;
use std::path::PathBuf;
use tracing::info;

/// Runtime context for CLI execution: the effective configuration.
pub struct RunContext {
    config: InferenceConfig,
}

impl RunContext {
    /// Load configuration from an explicit file, or from the workspace layers.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, InferenceError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(config.validated()?))
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn execute(&self, command: &Commands) -> Result<String, InferenceError> {
        match command {
            Commands::Run { model, depth, json } => self.run(model, *depth, *json),
            Commands::Anytime {
                model,
                step,
                cycles,
                json,
            } => self.anytime(model, *step, *cycles, *json),
            Commands::Models => Ok(format_models_text(demos::demos())),
            Commands::Config => Ok(toml::to_string_pretty(&self.config)?),
        }
    }

    fn run(&self, model: &str, depth: usize, json: bool) -> Result<String, InferenceError> {
        let demo = build_demo(model)?;
        let mut algorithm = LazyStructuredVe::with_config(
            demo.targets(),
            ExecutionMode::OneShot { depth },
            &self.config,
        )?;
        let solution = algorithm.run()?;
        info!(model, depth, "One-shot run complete");

        let label = demo.universe.label(demo.target);
        if json {
            format_solution_json(&label, &solution, demo.target)
        } else {
            Ok(format_solution_text(&label, &solution, demo.target))
        }
    }

    fn anytime(
        &self,
        model: &str,
        step: Option<usize>,
        cycles: usize,
        json: bool,
    ) -> Result<String, InferenceError> {
        let demo = build_demo(model)?;
        let mut algorithm = LazyStructuredVe::with_config(
            demo.targets(),
            ExecutionMode::Iterative { step },
            &self.config,
        )?;

        let mut rows = Vec::with_capacity(cycles);
        for cycle in 1..=cycles {
            let solution = algorithm.run_cycle()?;
            let marginal = solution
                .marginal(demo.target)
                .ok_or(InferenceError::UnknownTarget(demo.target))?;
            let (top_value, top_probability) = CycleRow::top(marginal);
            let (components, problems, placeholders, fingerprint) = algorithm
                .structure()
                .map(|s| {
                    (
                        s.component_count(),
                        s.problem_count(),
                        s.placeholder_count(),
                        s.short_fingerprint(),
                    )
                })
                .unwrap_or_default();
            rows.push(CycleRow {
                cycle,
                depth: solution.depth,
                components,
                problems,
                placeholders,
                fingerprint,
                unresolved: marginal.unresolved(),
                top_value,
                top_probability,
            });
        }
        algorithm.stop();
        info!(model, cycles, "Anytime run complete");

        let label = demo.universe.label(demo.target);
        if json {
            format_cycles_json(&label, &rows)
        } else {
            let mut out = format_cycles_text(&label, &rows);
            if let Ok(solution) = algorithm.solution() {
                out.push('\n');
                out.push_str(&format_solution_text(&label, &solution, demo.target));
            }
            Ok(out)
        }
    }
}

fn build_demo(name: &str) -> Result<DemoModel, InferenceError> {
    demos::find(name).map(|d| d.build()).ok_or_else(|| {
        let known: Vec<&str> = demos::demos().iter().map(|d| d.name).collect();
        InferenceError::ConfigError(format!(
            "Unknown model '{}' (available: {})",
            name,
            known.join(", ")
        ))
    })
}
