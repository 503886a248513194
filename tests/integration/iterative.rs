//! Iterative (anytime) runs: deepening cycle by cycle

use crate::integration::test_utils::{assert_close, recursive_geometric};
use lazyve::config::InferenceConfig;
use lazyve::{
    AlgorithmState, ElementId, ExecutionMode, InferenceError, LazyStructuredVe, Target, Universe,
    Value,
};

#[test]
fn test_default_step_depths() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, flips)], None).unwrap();

    algorithm.run_cycles(3).unwrap();
    assert_eq!(algorithm.depth_history(), &[1, 2, 3]);
    assert_eq!(algorithm.current_depth(), Some(3));
    assert_eq!(algorithm.state(), AlgorithmState::Solved);
}

#[test]
fn test_configured_default_step() {
    let u = Universe::new();
    let x = u.geometric(0.5);
    let mut config = InferenceConfig::default();
    config.iterative.default_step = 3;
    let mut algorithm = LazyStructuredVe::with_config(
        vec![Target::new(&u, x)],
        ExecutionMode::Iterative { step: None },
        &config,
    )
    .unwrap();

    algorithm.run_cycles(2).unwrap();
    assert_eq!(algorithm.depth_history(), &[3, 6]);
}

#[test]
fn test_unresolved_mass_shrinks_each_cycle() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm =
        LazyStructuredVe::iterative(vec![Target::new(&u, flips)], Some(1)).unwrap();

    let mut previous = f64::INFINITY;
    for depth in 1..=5 {
        let solution = algorithm.run_cycle().unwrap();
        let unresolved = solution.marginal(flips).unwrap().unresolved();
        assert_eq!(solution.depth, depth);
        assert_close(unresolved, 0.5f64.powi(depth as i32));
        assert!(unresolved < previous);
        previous = unresolved;
    }
}

#[test]
fn test_explicit_step_two() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm =
        LazyStructuredVe::iterative(vec![Target::new(&u, flips)], Some(2)).unwrap();

    let first = algorithm.run_cycle().unwrap();
    let second = algorithm.run_cycle().unwrap();
    assert_eq!(algorithm.depth_history(), &[2, 4]);
    assert_close(first.marginal(flips).unwrap().unresolved(), 0.25);
    assert_close(second.marginal(flips).unwrap().unresolved(), 0.0625);
    // Earlier snapshots are unaffected by later cycles.
    assert_eq!(first.depth, 2);
    assert_close(first.marginal(flips).unwrap().probability(&Value::Int(3)), 0.0);
    assert_close(second.marginal(flips).unwrap().probability(&Value::Int(3)), 0.125);
}

#[test]
fn test_run_until_tail_is_small() {
    // Atomic geometric with p = 0.5: the tail at depth d is 0.5^(d + 1),
    // which first drops below 0.01 at depth 6.
    let u = Universe::new();
    let x = u.geometric(0.5);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, x)], None).unwrap();

    let solution = algorithm
        .run_until(|s| s.marginal(x).map_or(false, |m| m.unresolved() < 0.01), 20)
        .unwrap();
    assert_eq!(solution.depth, 6);
    assert_eq!(algorithm.current_depth(), Some(6));
    assert_close(solution.marginal(x).unwrap().unresolved(), 0.5f64.powi(7));
}

#[test]
fn test_run_until_respects_max_cycles() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, flips)], None).unwrap();

    let solution = algorithm.run_until(|_| false, 2).unwrap();
    assert_eq!(solution.depth, 2);
    assert_eq!(algorithm.state(), AlgorithmState::Solved);
}

#[test]
fn test_stop_keeps_latest_solution() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, flips)], None).unwrap();
    algorithm.run_cycles(2).unwrap();

    algorithm.stop();
    assert_eq!(algorithm.state(), AlgorithmState::Terminated);
    assert!(matches!(
        algorithm.run_cycle().err().unwrap(),
        InferenceError::Terminated
    ));
    assert!(matches!(
        algorithm.initialize().err().unwrap(),
        InferenceError::Terminated
    ));

    let marginal = algorithm.distribution(flips).unwrap();
    assert_close(marginal.probability(&Value::Int(2)), 0.25);
    assert_eq!(algorithm.depth_history(), &[1, 2]);
}

#[test]
fn test_stop_before_any_cycle() {
    let u = Universe::new();
    let x = u.flip(0.5);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, x)], None).unwrap();

    algorithm.stop();
    assert!(matches!(
        algorithm.solution().err().unwrap(),
        InferenceError::NoSolution
    ));
    assert!(algorithm.structure().is_none());
}

#[test]
fn test_manual_steps_follow_state_machine() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, flips)], None).unwrap();

    algorithm.initialize().unwrap();
    assert_eq!(algorithm.state(), AlgorithmState::Initialized);
    assert!(matches!(
        algorithm.initialize().err().unwrap(),
        InferenceError::InvalidState { .. }
    ));

    assert_eq!(algorithm.refine().unwrap(), 1);
    assert_eq!(algorithm.state(), AlgorithmState::Refined);
    algorithm.solve().unwrap();
    assert_eq!(algorithm.state(), AlgorithmState::Solved);

    // Re-solving the same structure gives the same answer.
    let again = algorithm.solve().unwrap();
    assert_eq!(again.depth, 1);
    assert_close(again.marginal(flips).unwrap().unresolved(), 0.5);

    assert_eq!(algorithm.refine().unwrap(), 2);
    let deeper = algorithm.solve().unwrap();
    assert_close(deeper.marginal(flips).unwrap().unresolved(), 0.25);
}

/// Coin whose continuation chains back to itself once it is opened.
fn cyclic_below_first_level(u: &Universe) -> ElementId {
    let coin = u.flip(0.5);
    u.chain(coin, |_, u| {
        let inner = u.flip(0.5);
        let me = ElementId(u.len());
        u.chain(inner, move |_, _| me)
    })
}

#[test]
fn test_failed_refine_blocks_solve() {
    let u = Universe::new();
    let x = cyclic_below_first_level(&u);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, x)], None).unwrap();

    algorithm.run_cycle().unwrap();
    assert!(matches!(
        algorithm.run_cycle().err().unwrap(),
        InferenceError::CyclicModel(_)
    ));
    assert_eq!(algorithm.state(), AlgorithmState::Initialized);

    // The half-extended structure is never solved.
    assert!(matches!(
        algorithm.solve().err().unwrap(),
        InferenceError::InvalidState { action: "solve", .. }
    ));
    assert_eq!(algorithm.solution().unwrap().depth, 1);
    assert!(algorithm.refine().is_err());
    assert_eq!(algorithm.state(), AlgorithmState::Initialized);
}
