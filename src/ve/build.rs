//! Factor construction for expanded components.

use super::factor::{Factor, Variable};
use crate::error::{InferenceError, Result};
use crate::model::ElementKind;
use crate::structure::{Component, Structure};
use crate::types::{ElementId, Extended, Value};

/// Every factor a component contributes: its distribution or deterministic
/// relation, plus one factor per condition or constraint on its element.
pub fn component_factors(structure: &Structure, component: &Component) -> Result<Vec<Factor>> {
    let universe = structure.universe();
    let element = universe.element(component.element)?;
    let e = component.element;
    let mut factors = Vec::new();

    match &element.kind {
        ElementKind::Constant(c) => {
            factors.push(factor_over(structure, &[e], |v| indicator(v[0].regular() == Some(c)))?);
        }
        ElementKind::Select(choices) => {
            factors.push(factor_over(structure, &[e], |v| {
                choices
                    .iter()
                    .filter(|(_, c)| v[0].regular() == Some(c))
                    .map(|(w, _)| w)
                    .sum()
            })?);
        }
        ElementKind::Geometric { p } => {
            let regular = component.range.iter().filter(|v| !v.is_star()).count();
            let tail = (1.0 - p).powi(regular as i32);
            factors.push(factor_over(structure, &[e], |v| match v[0] {
                Extended::Regular(Value::Int(k)) if *k >= 0 => p * (1.0 - p).powi(*k as i32),
                Extended::Regular(_) => 0.0,
                Extended::Star => tail,
            })?);
        }
        ElementKind::Apply { args, f } => {
            let mut vars = args.clone();
            vars.push(e);
            let n = args.len();
            let mut inputs = Vec::with_capacity(n);
            factors.push(factor_over(structure, &vars, |v| {
                inputs.clear();
                inputs.extend(v[..n].iter().filter_map(|x| x.regular().cloned()));
                if inputs.len() < n {
                    indicator(v[n].is_star())
                } else {
                    indicator(v[n].regular() == Some(&f(inputs.as_slice())))
                }
            })?);
        }
        ElementKind::Chain { parent, .. } => {
            factors.extend(chain_factors(structure, component, *parent)?);
        }
    }

    for condition in universe.conditions(e) {
        factors.push(factor_over(structure, &[e], |v| match v[0] {
            Extended::Regular(x) => indicator(condition(x)),
            Extended::Star => 1.0,
        })?);
    }
    for constraint in universe.constraints(e) {
        factors.push(factor_over(structure, &[e], |v| match v[0] {
            Extended::Regular(x) => constraint(x),
            Extended::Star => 1.0,
        })?);
    }

    Ok(factors)
}

/// Chain factors. A parent value whose subproblem is not resolved sends the
/// chain to `*`.
fn chain_factors(
    structure: &Structure,
    component: &Component,
    parent: ElementId,
) -> Result<Vec<Factor>> {
    let e = component.element;
    let resolved: Vec<(Value, ElementId)> = component
        .subproblems
        .keys()
        .filter_map(|v| structure.chain_target(component, v).map(|t| (v.clone(), t)))
        .collect();
    let resolve = |value: &Extended| -> Option<ElementId> {
        let value = value.regular()?;
        resolved.iter().find(|(v, _)| v == value).map(|(_, t)| *t)
    };

    if structure.single_chain_factor() {
        let mut vars = vec![parent, e];
        vars.extend(resolved.iter().map(|(_, t)| *t));
        let factor = factor_over(structure, &vars, |v| match resolve(v[0]) {
            Some(target) => {
                let i = 2 + resolved.iter().position(|(_, t)| *t == target).unwrap_or(0);
                indicator(v[1] == v[i])
            }
            None => indicator(v[1].is_star()),
        })?;
        return Ok(vec![factor]);
    }

    let mut factors = vec![factor_over(structure, &[parent, e], |v| {
        match resolve(v[0]) {
            Some(_) => 1.0,
            None => indicator(v[1].is_star()),
        }
    })?];
    for (value, target) in &resolved {
        factors.push(factor_over(structure, &[parent, e, *target], |v| {
            if v[0].regular() != Some(value) {
                1.0
            } else {
                indicator(v[1] == v[2])
            }
        })?);
    }
    Ok(factors)
}

/// Factor over the listed elements, which may repeat. `weight` sees one value
/// per listed element, in listing order.
fn factor_over<F>(structure: &Structure, elements: &[ElementId], mut weight: F) -> Result<Factor>
where
    F: FnMut(&[&Extended]) -> f64,
{
    let mut vars: Vec<Variable> = Vec::new();
    let mut ranges: Vec<&[Extended]> = Vec::new();
    let mut slots = Vec::with_capacity(elements.len());
    for &element in elements {
        match vars.iter().position(|v| v.element == element) {
            Some(i) => slots.push(i),
            None => {
                let range = structure.range(element)?;
                if range.is_empty() {
                    return Err(InferenceError::SolveFailed(format!(
                        "element {} has not been expanded",
                        element
                    )));
                }
                slots.push(vars.len());
                vars.push(Variable {
                    element,
                    size: range.len(),
                });
                ranges.push(range);
            }
        }
    }

    let mut values: Vec<&Extended> = Vec::with_capacity(slots.len());
    Ok(Factor::from_fn(vars, |assignment| {
        values.clear();
        values.extend(slots.iter().map(|&s| &ranges[s][assignment[s]]));
        weight(&values)
    }))
}

fn indicator(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
