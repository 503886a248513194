//! Deepening extends the existing structure instead of rebuilding it

use crate::integration::test_utils::recursive_geometric;
use lazyve::structure::{Component, Problem};
use lazyve::{Extended, LazyStructuredVe, Target, Universe};

fn snapshot(algorithm: &LazyStructuredVe) -> (Vec<Problem>, Vec<Component>) {
    let structure = algorithm.structure().unwrap();
    (structure.problems().to_vec(), structure.components().to_vec())
}

#[test]
fn test_deeper_cycles_extend_structure() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, flips)], None).unwrap();

    let mut previous: Option<(Vec<Problem>, Vec<Component>)> = None;
    for _ in 0..3 {
        algorithm.run_cycle().unwrap();
        let (problems, components) = snapshot(&algorithm);

        if let Some((old_problems, old_components)) = previous {
            assert!(problems.len() > old_problems.len());
            assert!(components.len() > old_components.len());

            for old in &old_problems {
                let new = &problems[old.id.0];
                assert_eq!(new.parent, old.parent);
                assert_eq!(new.level, old.level);
                assert_eq!(new.origin, old.origin);
                if old.target.is_some() {
                    assert_eq!(new.target, old.target);
                }
            }

            for old in &old_components {
                let new = &components[old.id.0];
                assert_eq!(new.element, old.element);
                assert_eq!(new.owner, old.owner);
                assert!(new.depth >= old.depth);
                for value in old.range.iter().filter(|v| !v.is_star()) {
                    assert!(new.range.contains(value), "lost {} from {}", value, new.element);
                }
                for (value, problem) in &old.subproblems {
                    assert_eq!(new.subproblems.get(value), Some(problem));
                }
            }
        }
        previous = Some((problems, components));
    }
}

#[test]
fn test_target_range_grows_with_depth() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::iterative(vec![Target::new(&u, flips)], None).unwrap();

    let mut lengths = Vec::new();
    for _ in 0..3 {
        algorithm.run_cycle().unwrap();
        let range = algorithm.structure().unwrap().range(flips).unwrap().to_vec();
        assert_eq!(range.last(), Some(&Extended::Star));
        lengths.push(range.len());
    }
    assert_eq!(lengths, vec![2, 3, 4]);
}

#[test]
fn test_refining_twice_at_fixed_depth_is_idempotent() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, flips)], 2).unwrap();

    algorithm.refine().unwrap();
    let (problems, components) = snapshot(&algorithm);
    let fingerprint = algorithm.structure().unwrap().fingerprint();
    let elements = u.len();

    algorithm.refine().unwrap();
    assert_eq!(algorithm.structure().unwrap().fingerprint(), fingerprint);
    assert_eq!(snapshot(&algorithm), (problems, components));
    // No chain function was called a second time.
    assert_eq!(u.len(), elements);
    assert_eq!(algorithm.depth_history(), &[2, 2]);
}

#[test]
fn test_frontier_components_precede_expansion() {
    let u = Universe::new();
    let flips = recursive_geometric(&u);
    let coin = u.flip(0.3);
    u.observe(coin, true);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, flips)], 1).unwrap();
    assert_eq!(algorithm.frontier(), &[flips, coin]);

    algorithm.initialize().unwrap();
    let structure = algorithm.structure().unwrap();
    assert_eq!(structure.component_count(), 2);
    assert!(structure.is_pinned(flips));
    assert!(structure.is_pinned(coin));
    assert!(structure.components().iter().all(|c| !c.is_expanded()));
}

#[test]
fn test_unrelated_elements_are_not_expanded() {
    let u = Universe::new();
    let x = u.flip(0.5);
    let unrelated = u.geometric(0.2);
    let mut algorithm = LazyStructuredVe::one_shot(vec![Target::new(&u, x)], 4).unwrap();
    algorithm.run().unwrap();

    let structure = algorithm.structure().unwrap();
    assert!(structure.component_for(unrelated).is_none());
    assert_eq!(structure.problem_count(), 1);
}
