//! One-shot runs: a single refine and solve at a fixed depth

use crate::integration::test_utils::{assert_close, observed_or, recursive_geometric};
use lazyve::config::InferenceConfig;
use lazyve::demos;
use lazyve::ve::Heuristic;
use lazyve::{
    AlgorithmState, ExecutionMode, Extended, InferenceError, LazyStructuredVe, Target, Universe,
    Value,
};

#[test]
fn test_depth_zero_leaves_recursion_unresolved() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, flips)], 0).unwrap();

    let solution = algorithm.run().unwrap();
    let marginal = solution.marginal(flips).unwrap();
    assert_eq!(solution.depth, 0);
    assert_close(marginal.unresolved(), 1.0);
    assert_eq!(marginal.expectation(Value::as_f64), None);
    assert_eq!(algorithm.state(), AlgorithmState::Terminated);
}

#[test]
fn test_recursive_geometric_at_depth_three() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, flips)], 3).unwrap();
    algorithm.run().unwrap();

    let marginal = algorithm.distribution(flips).unwrap();
    assert_close(marginal.probability(&Value::Int(1)), 0.5);
    assert_close(marginal.probability(&Value::Int(2)), 0.25);
    assert_close(marginal.probability(&Value::Int(3)), 0.125);
    assert_close(marginal.probability(&Value::Int(4)), 0.0);
    assert_close(marginal.unresolved(), 0.125);

    let mean = algorithm.expectation(flips, Value::as_f64).unwrap().unwrap();
    assert_close(mean, (0.5 + 0.5 + 0.375) / 0.875);
}

#[test]
fn test_observed_or_posterior() {
    let u = Universe::new();
    let (a, b, _) = observed_or(&u);
    let mut algorithm =
        LazyStructuredVe::one_shot(vec![Target::new(&u, a), Target::new(&u, b)], 1).unwrap();
    algorithm.run().unwrap();

    assert_close(algorithm.probability(a, &Value::Bool(true)).unwrap(), 2.0 / 3.0);
    assert_close(algorithm.probability(b, &Value::Bool(true)).unwrap(), 2.0 / 3.0);
    assert_close(algorithm.distribution(a).unwrap().unresolved(), 0.0);
}

#[test]
fn test_condition_on_atomic_geometric() {
    // Failures before success with p = 0.3, observed non-zero. At depth 2 the
    // range is [0, 1, 2, *]; the tail keeps its prior mass 0.7^3.
    let u = Universe::new();
    let failures = u.geometric(0.3);
    u.condition(failures, |v| v.as_int() != Some(0));
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, failures)], 2).unwrap();

    let marginal = algorithm.run().unwrap().marginal(failures).unwrap().clone();
    assert_close(marginal.probability(&Value::Int(0)), 0.0);
    assert_close(marginal.probability(&Value::Int(1)), 0.21 / 0.7);
    assert_close(marginal.probability(&Value::Int(2)), 0.147 / 0.7);
    assert_close(marginal.unresolved(), 0.343 / 0.7);
}

#[test]
fn test_constraint_reweights_values() {
    let u = Universe::new();
    let x = u.uniform(vec![Value::Int(1), Value::Int(2)]);
    u.constrain(x, |v| if v.as_int() == Some(2) { 3.0 } else { 1.0 });
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, x)], 0).unwrap();

    algorithm.run().unwrap();
    assert_close(algorithm.probability(x, &Value::Int(2)).unwrap(), 0.75);
}

#[test]
fn test_impossible_evidence_fails_solve() {
    let u = Universe::new();
    let x = u.constant(1i64);
    u.observe(x, 2i64);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, x)], 1).unwrap();

    algorithm.refine().unwrap();
    let err = algorithm.solve().err().unwrap();
    assert!(matches!(err, InferenceError::ZeroProbabilityEvidence));
    assert_eq!(algorithm.state(), AlgorithmState::Refined);
    assert!(matches!(
        algorithm.solution().err().unwrap(),
        InferenceError::NoSolution
    ));
}

#[test]
fn test_terminated_rejects_further_steps() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, flips)], 2).unwrap();
    let first = algorithm.run().unwrap();

    assert!(matches!(
        algorithm.refine().err().unwrap(),
        InferenceError::Terminated
    ));
    assert!(matches!(
        algorithm.solve().err().unwrap(),
        InferenceError::Terminated
    ));
    assert!(matches!(
        algorithm.run_cycle().err().unwrap(),
        InferenceError::Terminated
    ));
    assert_eq!(*algorithm.solution().unwrap(), *first);
    assert_eq!(algorithm.depth_history(), &[2]);
}

#[test]
fn test_solve_before_refine_is_invalid_state() {
    let u = Universe::new();
    let x = u.flip(0.5);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, x)], 1).unwrap();

    let err = algorithm.solve().err().unwrap();
    assert!(matches!(err, InferenceError::InvalidState { .. }));
    assert_eq!(algorithm.state(), AlgorithmState::Constructed);
}

#[test]
fn test_query_for_non_target() {
    let u = Universe::new();
    let (a, _, c) = observed_or(&u);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, a)], 1).unwrap();
    algorithm.run().unwrap();

    assert!(matches!(
        algorithm.distribution(c).err().unwrap(),
        InferenceError::UnknownTarget(id) if id == c
    ));
}

#[test]
fn test_heuristics_agree() {
    let model = demos::find("tree-size").unwrap().build();
    let mut results = Vec::new();
    for heuristic in [Heuristic::MinDegree, Heuristic::MinFill] {
        let mut config = InferenceConfig::default();
        config.elimination.heuristic = heuristic;
        let mut algorithm = LazyStructuredVe::with_config(
            model.targets(),
            ExecutionMode::OneShot { depth: 3 },
            &config,
        )
        .unwrap();
        results.push(algorithm.run().unwrap().marginal(model.target).unwrap().clone());
    }

    let (min_degree, min_fill) = (&results[0], &results[1]);
    assert_eq!(min_degree.len(), min_fill.len());
    for ((va, pa), (vb, pb)) in min_degree.iter().zip(min_fill.iter()) {
        assert_eq!(va, vb);
        assert_close(pa, pb);
    }
    // Size 1 needs no branching at all.
    assert_close(min_degree.probability(&Value::Int(1)), 0.6);
}

#[test]
fn test_split_chain_factors_agree_with_merged() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut marginals = Vec::new();
    for single_chain_factor in [true, false] {
        let mut config = InferenceConfig::default();
        config.structure.single_chain_factor = single_chain_factor;
        let mut algorithm = LazyStructuredVe::with_config(
            vec![Target::new(&u, flips)],
            ExecutionMode::OneShot { depth: 3 },
            &config,
        )
        .unwrap();
        algorithm.run().unwrap();
        assert_eq!(
            algorithm.structure().unwrap().single_chain_factor(),
            single_chain_factor
        );
        marginals.push(algorithm.distribution(flips).unwrap());
    }
    for ((va, pa), (vb, pb)) in marginals[0].iter().zip(marginals[1].iter()) {
        assert_eq!(va, vb);
        assert_close(pa, pb);
    }
    assert!(marginals[1].iter().any(|(v, _)| *v == Extended::Star));
}
