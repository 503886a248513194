//! Ranging policy requests and how far infinite supports grow per cycle

use crate::integration::test_utils::assert_close;
use lazyve::config::InferenceConfig;
use lazyve::expand::LazyExpander;
use lazyve::ranging::{LazyRanger, Ranger, RangingPolicy};
use lazyve::ve::{Heuristic, VariableElimination};
use lazyve::{ElementId, ExecutionMode, LazyStructuredVe, Target, Universe};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every bound it is asked for.
#[derive(Clone, Default)]
struct RecordingRanger {
    requests: Arc<Mutex<Vec<usize>>>,
}

impl Ranger for RecordingRanger {
    fn lazy_range(&self, depth_bound: usize) -> RangingPolicy {
        self.requests.lock().push(depth_bound);
        LazyRanger::default().lazy_range(depth_bound)
    }
}

/// Always hands out the same bound.
struct CappedRanger(usize);

impl Ranger for CappedRanger {
    fn lazy_range(&self, _depth_bound: usize) -> RangingPolicy {
        LazyRanger::default().lazy_range(self.0)
    }
}

fn build<R: Ranger>(
    u: &Arc<Universe>,
    target: ElementId,
    mode: ExecutionMode,
    ranger: R,
) -> LazyStructuredVe<LazyExpander, VariableElimination, R> {
    LazyStructuredVe::with_collaborators(
        vec![Target::new(u, target)],
        mode,
        &InferenceConfig::default(),
        LazyExpander,
        VariableElimination::new(Heuristic::MinFill),
        ranger,
    )
    .unwrap()
}

fn range_len<R: Ranger>(
    algorithm: &LazyStructuredVe<LazyExpander, VariableElimination, R>,
    x: ElementId,
) -> usize {
    algorithm.structure().unwrap().range(x).unwrap().len()
}

#[test]
fn test_iterative_requests_one_step_per_cycle() {
    let u = Universe::new();
    let x = u.geometric(0.5);
    let ranger = RecordingRanger::default();
    let requests = Arc::clone(&ranger.requests);
    let mut algorithm = build(&u, x, ExecutionMode::Iterative { step: Some(2) }, ranger);

    algorithm.run_cycles(3).unwrap();
    assert_eq!(algorithm.depth_history(), &[2, 4, 6]);
    assert_eq!(*requests.lock(), vec![2, 2, 2]);
}

#[test]
fn test_one_shot_requests_full_depth() {
    let u = Universe::new();
    let x = u.geometric(0.5);
    let ranger = RecordingRanger::default();
    let requests = Arc::clone(&ranger.requests);
    let mut algorithm = build(&u, x, ExecutionMode::OneShot { depth: 5 }, ranger);

    algorithm.run().unwrap();
    assert_eq!(*requests.lock(), vec![5]);
}

#[test]
fn test_zero_bound_freezes_geometric_support() {
    let u = Universe::new();
    let x = u.geometric(0.5);
    let mut algorithm = build(&u, x, ExecutionMode::Iterative { step: Some(2) }, CappedRanger(0));

    for _ in 0..3 {
        let solution = algorithm.run_cycle().unwrap();
        assert_eq!(range_len(&algorithm, x), 2);
        assert_close(solution.marginal(x).unwrap().unresolved(), 0.5);
    }
}

#[test]
fn test_bound_limits_growth_per_cycle() {
    let u = Universe::new();
    let x = u.geometric(0.5);
    let mut algorithm = build(&u, x, ExecutionMode::Iterative { step: Some(2) }, CappedRanger(1));

    let mut lengths = Vec::new();
    for _ in 0..3 {
        algorithm.run_cycle().unwrap();
        lengths.push(range_len(&algorithm, x));
    }
    assert_eq!(lengths, vec![3, 4, 5]);
}

#[test]
fn test_default_ranger_keeps_pace_with_step() {
    let u = Universe::new();
    let x = u.geometric(0.5);
    let mut algorithm = build(
        &u,
        x,
        ExecutionMode::Iterative { step: Some(2) },
        LazyRanger::default(),
    );

    let solution = algorithm.run_cycles(3).unwrap();
    assert_eq!(range_len(&algorithm, x), 8);
    assert_close(solution.marginal(x).unwrap().unresolved(), 0.5f64.powi(7));
}
