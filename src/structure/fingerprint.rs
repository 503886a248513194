//! Structure digest using BLAKE3

use super::{Component, Problem};
use crate::types::{Extended, Value};
use blake3::Hasher;

/// digest = hash("problems" || count || problems || "components" || count || components)
///
/// Problems and components are hashed in index order, which is stable for the
/// life of a structure.
pub(super) fn compute(problems: &[Problem], components: &[Component]) -> [u8; 32] {
    let mut hasher = Hasher::new();

    hasher.update(b"problems");
    hasher.update(&(problems.len() as u64).to_be_bytes());
    for problem in problems {
        hash_problem(&mut hasher, problem);
    }

    hasher.update(b"components");
    hasher.update(&(components.len() as u64).to_be_bytes());
    for component in components {
        hash_component(&mut hasher, component);
    }

    *hasher.finalize().as_bytes()
}

fn hash_problem(hasher: &mut Hasher, problem: &Problem) {
    hash_usize(hasher, problem.id.0);
    hash_opt(hasher, problem.parent.map(|p| p.0));
    hash_usize(hasher, problem.level);
    match &problem.origin {
        Some((chain, value)) => {
            hasher.update(b"origin");
            hash_usize(hasher, chain.0);
            hash_value(hasher, value);
        }
        None => {
            hasher.update(b"root");
        }
    }
    hash_opt(hasher, problem.target.map(|t| t.0));
    hash_opt(hasher, problem.expanded_depth);
}

fn hash_component(hasher: &mut Hasher, component: &Component) {
    hash_usize(hasher, component.id.0);
    hash_usize(hasher, component.element.0);
    hash_usize(hasher, component.owner.0);
    hash_opt(hasher, component.depth);

    hash_usize(hasher, component.range.len());
    for value in &component.range {
        match value {
            Extended::Regular(v) => hash_value(hasher, v),
            Extended::Star => {
                hasher.update(b"*");
            }
        }
    }

    // BTreeMap iteration is ordered
    hash_usize(hasher, component.subproblems.len());
    for (value, problem) in &component.subproblems {
        hash_value(hasher, value);
        hash_usize(hasher, problem.0);
    }
}

fn hash_value(hasher: &mut Hasher, value: &Value) {
    match value {
        Value::Bool(b) => {
            hasher.update(b"b");
            hasher.update(&[*b as u8]);
        }
        Value::Int(i) => {
            hasher.update(b"i");
            hasher.update(&i.to_be_bytes());
        }
        Value::Str(s) => {
            hasher.update(b"s");
            hash_usize(hasher, s.len());
            hasher.update(s.as_bytes());
        }
    }
}

fn hash_usize(hasher: &mut Hasher, n: usize) {
    hasher.update(&(n as u64).to_be_bytes());
}

fn hash_opt(hasher: &mut Hasher, n: Option<usize>) {
    match n {
        Some(n) => {
            hasher.update(&[1]);
            hash_usize(hasher, n);
        }
        None => {
            hasher.update(&[0]);
        }
    }
}
