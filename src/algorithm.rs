//! Lazy structured variable elimination: the orchestrator.
//!
//! [`LazyStructuredVe`] owns the expanded structure and alternates refinement and
//! solving. In one-shot mode it performs exactly one refine and one solve, then
//! terminates. In iterative mode every cycle asks the depth controller for a
//! strictly larger depth, extends the structure and re-solves; the latest
//! solution can be read at any time.

use crate::config::InferenceConfig;
use crate::depth::DepthController;
use crate::error::{InferenceError, Result};
use crate::expand::{Expander, LazyExpander};
use crate::frontier::initial_frontier;
use crate::model::{Target, Universe};
use crate::ranging::{LazyRanger, Ranger};
use crate::refine::RefinementDriver;
use crate::solve::{Marginal, Solution, SolveDriver};
use crate::structure::Structure;
use crate::types::{ComponentId, ElementId, Value};
use crate::validate::validate_targets;
use crate::ve::{Solver, VariableElimination};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How the algorithm schedules depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// One refine and one solve at a fixed depth.
    OneShot { depth: usize },
    /// Repeated cycles at `step, 2*step, ...`. `None` uses the configured default.
    Iterative { step: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmState {
    Constructed,
    Initialized,
    Refined,
    Solved,
    Terminated,
}

impl fmt::Display for AlgorithmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmState::Constructed => "constructed",
            AlgorithmState::Initialized => "initialized",
            AlgorithmState::Refined => "refined",
            AlgorithmState::Solved => "solved",
            AlgorithmState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

pub struct LazyStructuredVe<E = LazyExpander, S = VariableElimination, R = LazyRanger> {
    universe: Arc<Universe>,
    targets: Vec<ElementId>,
    frontier: Vec<ElementId>,
    mode: ExecutionMode,
    depth: DepthController,
    single_chain_factor: bool,
    refiner: RefinementDriver<E>,
    solver: SolveDriver<S>,
    ranger: R,
    structure: Option<Structure>,
    frontier_components: Vec<ComponentId>,
    target_components: Vec<ComponentId>,
    depth_history: Vec<usize>,
    solution: Option<Arc<Solution>>,
    state: AlgorithmState,
}

impl LazyStructuredVe {
    /// Solve once at `depth`.
    pub fn one_shot(targets: Vec<Target>, depth: usize) -> Result<Self> {
        Self::with_config(
            targets,
            ExecutionMode::OneShot { depth },
            &InferenceConfig::default(),
        )
    }

    /// Anytime solving with depths `step, 2*step, ...`.
    pub fn iterative(targets: Vec<Target>, step: Option<usize>) -> Result<Self> {
        Self::with_config(
            targets,
            ExecutionMode::Iterative { step },
            &InferenceConfig::default(),
        )
    }

    pub fn with_config(
        targets: Vec<Target>,
        mode: ExecutionMode,
        config: &InferenceConfig,
    ) -> Result<Self> {
        Self::with_collaborators(
            targets,
            mode,
            config,
            LazyExpander,
            VariableElimination::new(config.elimination.heuristic),
            LazyRanger {
                values_per_depth: config.ranging.values_per_depth,
            },
        )
    }
}

impl<E: Expander, S: Solver, R: Ranger> LazyStructuredVe<E, S, R> {
    /// Validates the targets and fixes the frontier. No structure exists yet.
    pub fn with_collaborators(
        targets: Vec<Target>,
        mode: ExecutionMode,
        config: &InferenceConfig,
        expander: E,
        solver: S,
        ranger: R,
    ) -> Result<Self> {
        let (universe, targets) = validate_targets(targets)?;
        let depth = match mode {
            ExecutionMode::OneShot { depth } => DepthController::fixed(depth),
            ExecutionMode::Iterative { step } => {
                DepthController::incrementing(step.unwrap_or(config.iterative.default_step))?
            }
        };
        let config = config.clone().validated()?;

        let targets: Vec<ElementId> = targets.iter().map(Target::element).collect();
        let frontier = initial_frontier(&targets, &universe);
        debug!(
            targets = targets.len(),
            frontier = frontier.len(),
            ?mode,
            "Constructed algorithm"
        );

        Ok(LazyStructuredVe {
            universe,
            targets,
            frontier,
            mode,
            depth,
            single_chain_factor: config.structure.single_chain_factor,
            refiner: RefinementDriver::new(expander),
            solver: SolveDriver::new(solver),
            ranger,
            structure: None,
            frontier_components: Vec::new(),
            target_components: Vec::new(),
            depth_history: Vec::new(),
            solution: None,
            state: AlgorithmState::Constructed,
        })
    }

    /// One-time setup: creates the structure with the chain-factor preference and
    /// registers the frontier. Valid only in `Constructed`.
    pub fn initialize(&mut self) -> Result<()> {
        self.check_not_terminated()?;
        if self.state != AlgorithmState::Constructed {
            return Err(self.invalid("initialize"));
        }

        let mut structure = Structure::new(Arc::clone(&self.universe), self.single_chain_factor);
        self.frontier_components = structure.register_frontier(&self.frontier);
        self.target_components = self
            .targets
            .iter()
            .map(|&t| structure.ensure_component(t))
            .collect();
        self.structure = Some(structure);
        self.state = AlgorithmState::Initialized;
        info!(
            single_chain_factor = self.single_chain_factor,
            "Initialized structure"
        );
        Ok(())
    }

    /// Expand to the next depth. Initializes first if needed. Returns the depth used.
    pub fn refine(&mut self) -> Result<usize> {
        self.check_not_terminated()?;
        if self.state == AlgorithmState::Constructed {
            self.initialize()?;
        }

        let depth = self.depth.next_depth();
        self.depth_history.push(depth);
        let policy = self.ranger.lazy_range(self.depth.range_bound());
        let structure = self
            .structure
            .as_mut()
            .ok_or(InferenceError::InvalidState {
                action: "refine",
                state: self.state.to_string(),
            })?;
        if let Err(e) = self
            .refiner
            .refine(structure, &self.frontier_components, depth, &policy)
        {
            // A partially extended structure must not be solved.
            warn!(depth, error = %e, "Refinement failed");
            self.state = AlgorithmState::Initialized;
            return Err(e);
        }
        self.state = AlgorithmState::Refined;
        Ok(depth)
    }

    /// Solve the current structure. One-shot instances terminate afterwards.
    pub fn solve(&mut self) -> Result<Arc<Solution>> {
        self.check_not_terminated()?;
        if !matches!(self.state, AlgorithmState::Refined | AlgorithmState::Solved) {
            return Err(self.invalid("solve"));
        }
        let structure = self
            .structure
            .as_mut()
            .ok_or(InferenceError::InvalidState {
                action: "solve",
                state: self.state.to_string(),
            })?;

        let solution = Arc::new(self.solver.solve(structure, &self.target_components)?);
        self.solution = Some(Arc::clone(&solution));
        self.state = match self.mode {
            ExecutionMode::OneShot { .. } => AlgorithmState::Terminated,
            ExecutionMode::Iterative { .. } => AlgorithmState::Solved,
        };
        Ok(solution)
    }

    /// One refine followed by one solve.
    #[instrument(skip(self), fields(cycle = self.depth_history.len() + 1))]
    pub fn run_cycle(&mut self) -> Result<Arc<Solution>> {
        let depth = self.refine()?;
        let solution = self.solve()?;
        info!(depth, state = %self.state, "Cycle complete");
        Ok(solution)
    }

    /// Single cycle. For a one-shot instance this is the whole run.
    pub fn run(&mut self) -> Result<Arc<Solution>> {
        self.run_cycle()
    }

    /// Run `cycles` cycles and return the last solution.
    pub fn run_cycles(&mut self, cycles: usize) -> Result<Arc<Solution>> {
        for _ in 0..cycles {
            self.run_cycle()?;
        }
        self.solution()
    }

    /// Run cycles until `done` accepts a solution or `max_cycles` have run.
    pub fn run_until<F>(&mut self, mut done: F, max_cycles: usize) -> Result<Arc<Solution>>
    where
        F: FnMut(&Solution) -> bool,
    {
        for _ in 0..max_cycles {
            let solution = self.run_cycle()?;
            if done(&solution) || self.state == AlgorithmState::Terminated {
                return Ok(solution);
            }
        }
        self.solution()
    }

    /// Stop cycling. The latest solution stays queryable.
    pub fn stop(&mut self) {
        if self.state != AlgorithmState::Terminated {
            info!(cycles = self.depth_history.len(), "Stopped");
        }
        self.state = AlgorithmState::Terminated;
    }

    /// Snapshot of the latest solution.
    pub fn solution(&self) -> Result<Arc<Solution>> {
        self.solution.clone().ok_or(InferenceError::NoSolution)
    }

    pub fn distribution(&self, target: ElementId) -> Result<Marginal> {
        if !self.targets.contains(&target) {
            return Err(InferenceError::UnknownTarget(target));
        }
        let solution = self.solution()?;
        solution
            .marginal(target)
            .cloned()
            .ok_or(InferenceError::UnknownTarget(target))
    }

    pub fn probability(&self, target: ElementId, value: &Value) -> Result<f64> {
        Ok(self.distribution(target)?.probability(value))
    }

    /// Expectation over resolved values. `None` if nothing is resolved yet.
    pub fn expectation<F>(&self, target: ElementId, f: F) -> Result<Option<f64>>
    where
        F: Fn(&Value) -> Option<f64>,
    {
        Ok(self.distribution(target)?.expectation(f))
    }

    pub fn state(&self) -> AlgorithmState {
        self.state
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Every depth the controller has emitted, in order.
    pub fn depth_history(&self) -> &[usize] {
        &self.depth_history
    }

    pub fn current_depth(&self) -> Option<usize> {
        self.depth_history.last().copied()
    }

    pub fn frontier(&self) -> &[ElementId] {
        &self.frontier
    }

    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    /// `None` before initialization.
    pub fn structure(&self) -> Option<&Structure> {
        self.structure.as_ref()
    }

    fn check_not_terminated(&self) -> Result<()> {
        if self.state == AlgorithmState::Terminated {
            return Err(InferenceError::Terminated);
        }
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> InferenceError {
        InferenceError::InvalidState {
            action,
            state: self.state.to_string(),
        }
    }
}
