//! Dense factors over discrete variables.
//!
//! Tables are row-major: the last variable varies fastest.

use crate::types::ElementId;

/// A factor variable: an element and the size of its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    pub element: ElementId,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    vars: Vec<Variable>,
    values: Vec<f64>,
}

impl Factor {
    /// A factor with no variables.
    pub fn scalar(value: f64) -> Self {
        Factor {
            vars: Vec::new(),
            values: vec![value],
        }
    }

    /// Build a factor by evaluating `weight` on every assignment.
    /// Variables must be distinct.
    pub fn from_fn<F>(vars: Vec<Variable>, mut weight: F) -> Self
    where
        F: FnMut(&[usize]) -> f64,
    {
        let sizes: Vec<usize> = vars.iter().map(|v| v.size).collect();
        let mut values = Vec::with_capacity(table_len(&sizes));
        for_each_assignment(&sizes, |assignment| values.push(weight(assignment)));
        Factor { vars, values }
    }

    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn contains(&self, element: ElementId) -> bool {
        self.position(element).is_some()
    }

    fn position(&self, element: ElementId) -> Option<usize> {
        self.vars.iter().position(|v| v.element == element)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn value_at(&self, assignment: &[usize]) -> f64 {
        let strides = strides(&self.vars);
        let index: usize = assignment
            .iter()
            .zip(&strides)
            .map(|(a, s)| a * s)
            .sum();
        self.values[index]
    }

    /// Pointwise product over the union of both variable sets.
    pub fn product(&self, other: &Factor) -> Factor {
        let mut vars = self.vars.clone();
        for v in &other.vars {
            if !vars.iter().any(|u| u.element == v.element) {
                vars.push(*v);
            }
        }

        let self_strides = strides(&self.vars);
        let other_strides = strides(&other.vars);
        let other_positions: Vec<usize> = other
            .vars
            .iter()
            .map(|v| {
                vars.iter()
                    .position(|u| u.element == v.element)
                    .unwrap_or_default()
            })
            .collect();
        let n_self = self.vars.len();

        Factor::from_fn(vars, |assignment| {
            let i: usize = assignment[..n_self]
                .iter()
                .zip(&self_strides)
                .map(|(a, s)| a * s)
                .sum();
            let j: usize = other_positions
                .iter()
                .zip(&other_strides)
                .map(|(&p, s)| assignment[p] * s)
                .sum();
            self.values[i] * other.values[j]
        })
    }

    /// Sum a variable out. Returns a clone if the variable is absent.
    pub fn sum_out(&self, element: ElementId) -> Factor {
        let Some(pos) = self.position(element) else {
            return self.clone();
        };

        let vars: Vec<Variable> = self
            .vars
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos)
            .map(|(_, v)| *v)
            .collect();
        let new_strides = strides(&vars);
        let mut values = vec![0.0; table_len(&vars.iter().map(|v| v.size).collect::<Vec<_>>())];

        let sizes: Vec<usize> = self.vars.iter().map(|v| v.size).collect();
        let mut index = 0;
        for_each_assignment(&sizes, |assignment| {
            let target: usize = assignment
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != pos)
                .zip(&new_strides)
                .map(|((_, a), s)| a * s)
                .sum();
            values[target] += self.values[index];
            index += 1;
        });

        Factor { vars, values }
    }

    /// Unnormalized marginal over one variable, in range order.
    pub fn marginal(&self, element: ElementId) -> Option<Vec<f64>> {
        self.position(element)?;
        let others: Vec<ElementId> = self
            .vars
            .iter()
            .filter(|v| v.element != element)
            .map(|v| v.element)
            .collect();
        let reduced = others
            .into_iter()
            .fold(self.clone(), |factor, other| factor.sum_out(other));
        Some(reduced.values)
    }
}

fn table_len(sizes: &[usize]) -> usize {
    sizes.iter().product()
}

fn strides(vars: &[Variable]) -> Vec<usize> {
    let mut strides = vec![1; vars.len()];
    for i in (0..vars.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * vars[i + 1].size;
    }
    strides
}

/// Visit every assignment in row-major order. No variables means one empty
/// assignment; any empty domain means none.
pub(crate) fn for_each_assignment<F>(sizes: &[usize], mut visit: F)
where
    F: FnMut(&[usize]),
{
    if sizes.iter().any(|&s| s == 0) {
        return;
    }
    let mut assignment = vec![0; sizes.len()];
    loop {
        visit(&assignment);
        let mut i = sizes.len();
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            assignment[i] += 1;
            if assignment[i] < sizes[i] {
                break;
            }
            assignment[i] = 0;
        }
    }
}
