//! Greedy elimination ordering.

use super::factor::Factor;
use super::Heuristic;
use crate::types::ElementId;
use std::collections::{BTreeSet, HashSet};

/// Sum each candidate out of the pool, cheapest first by `heuristic`. Ties go to
/// the lower element id, so the order is deterministic.
pub fn eliminate_variables(
    mut factors: Vec<Factor>,
    candidates: &BTreeSet<ElementId>,
    heuristic: Heuristic,
) -> Vec<Factor> {
    let mut remaining: BTreeSet<ElementId> = candidates.clone();

    while !remaining.is_empty() {
        let next = remaining
            .iter()
            .copied()
            .min_by_key(|&x| (cost(&factors, x, heuristic), x));
        let Some(x) = next else {
            break;
        };
        remaining.remove(&x);

        let (touching, rest): (Vec<Factor>, Vec<Factor>) =
            factors.into_iter().partition(|f| f.contains(x));
        factors = rest;
        if touching.is_empty() {
            continue;
        }
        let combined = touching
            .iter()
            .skip(1)
            .fold(touching[0].clone(), |acc, f| acc.product(f));
        factors.push(combined.sum_out(x));
    }

    factors
}

fn neighbours(factors: &[Factor], x: ElementId) -> BTreeSet<ElementId> {
    factors
        .iter()
        .filter(|f| f.contains(x))
        .flat_map(|f| f.vars().iter().map(|v| v.element))
        .filter(|&y| y != x)
        .collect()
}

fn cost(factors: &[Factor], x: ElementId, heuristic: Heuristic) -> usize {
    let neighbours = neighbours(factors, x);
    match heuristic {
        Heuristic::MinDegree => neighbours.len(),
        Heuristic::MinFill => {
            let edges: HashSet<(ElementId, ElementId)> = factors
                .iter()
                .flat_map(|f| {
                    let vars: Vec<ElementId> = f.vars().iter().map(|v| v.element).collect();
                    let mut pairs = Vec::new();
                    for (i, &a) in vars.iter().enumerate() {
                        for &b in &vars[i + 1..] {
                            pairs.push((a.min(b), a.max(b)));
                        }
                    }
                    pairs
                })
                .collect();
            let list: Vec<ElementId> = neighbours.into_iter().collect();
            let mut fill = 0;
            for (i, &a) in list.iter().enumerate() {
                for &b in &list[i + 1..] {
                    if !edges.contains(&(a, b)) {
                        fill += 1;
                    }
                }
            }
            fill
        }
    }
}
