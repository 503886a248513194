//! Named demonstration models for the CLI and benchmarks.
//!
//! Each builder creates a fresh universe so repeated runs never share structure.

use crate::model::{Target, Universe};
use crate::types::{ElementId, Value};
use std::sync::Arc;

/// A model ready to query: its universe and the element of interest.
#[derive(Debug, Clone)]
pub struct DemoModel {
    pub universe: Arc<Universe>,
    pub target: ElementId,
}

impl DemoModel {
    pub fn targets(&self) -> Vec<Target> {
        vec![Target::new(&self.universe, self.target)]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Demo {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> DemoModel,
}

impl Demo {
    pub fn build(&self) -> DemoModel {
        (self.build)()
    }
}

const DEMOS: &[Demo] = &[
    Demo {
        name: "geometric",
        description: "Flip a fair coin until heads; number of flips (recursive)",
        build: geometric,
    },
    Demo {
        name: "tree-size",
        description: "Nodes in a random binary tree that branches with p = 0.4",
        build: tree_size,
    },
    Demo {
        name: "observed-walk",
        description: "Recursive walk length, constrained to favour even lengths",
        build: observed_walk,
    },
    Demo {
        name: "failures",
        description: "Geometric failures before success (p = 0.3), observed non-zero",
        build: failures,
    },
];

pub fn demos() -> &'static [Demo] {
    DEMOS
}

pub fn find(name: &str) -> Option<&'static Demo> {
    DEMOS.iter().find(|d| d.name == name)
}

/// Number of flips of a coin with `P(heads) = p` until the first heads,
/// starting the count at `count`.
pub fn flips_until_heads(u: &Universe, p: f64, count: i64) -> ElementId {
    let coin = u.flip(p);
    u.chain(coin, move |heads, u| {
        if heads.as_bool().unwrap_or(false) {
            u.constant(count)
        } else {
            flips_until_heads(u, p, count + 1)
        }
    })
}

/// Size of a binary tree where each node has two children with probability `p`.
pub fn binary_tree_size(u: &Universe, p: f64) -> ElementId {
    let branch = u.flip(p);
    u.chain(branch, move |branches, u| {
        if branches.as_bool().unwrap_or(false) {
            let left = binary_tree_size(u, p);
            let right = binary_tree_size(u, p);
            u.apply2(left, right, |l, r| {
                Value::Int(1 + l.as_int().unwrap_or(0) + r.as_int().unwrap_or(0))
            })
        } else {
            u.constant(1)
        }
    })
}

fn geometric() -> DemoModel {
    let universe = Universe::new();
    let target = flips_until_heads(&universe, 0.5, 1);
    universe.name(target, "flips");
    DemoModel { universe, target }
}

fn tree_size() -> DemoModel {
    let universe = Universe::new();
    let target = binary_tree_size(&universe, 0.4);
    universe.name(target, "size");
    DemoModel { universe, target }
}

fn observed_walk() -> DemoModel {
    let universe = Universe::new();
    let target = flips_until_heads(&universe, 0.4, 0);
    universe.name(target, "length");
    universe.constrain(target, |v| match v.as_int() {
        Some(n) if n % 2 == 0 => 2.0,
        _ => 1.0,
    });
    DemoModel { universe, target }
}

fn failures() -> DemoModel {
    let universe = Universe::new();
    let target = universe.geometric(0.3);
    universe.name(target, "failures");
    universe.condition(target, |v| v.as_int() != Some(0));
    DemoModel { universe, target }
}
