//! CLI presentation: text and json formatters.

use crate::demos::Demo;
use crate::error::InferenceError;
use crate::solve::{Marginal, Solution};
use crate::types::{ElementId, Extended, Value};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;
use serde_json::json;

/// One anytime cycle, as shown by `lazyve anytime`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRow {
    pub cycle: usize,
    pub depth: usize,
    pub components: usize,
    pub problems: usize,
    pub placeholders: usize,
    /// Short structure digest; unchanged digests mean the cycle added nothing.
    pub fingerprint: String,
    pub unresolved: f64,
    pub top_value: Option<String>,
    pub top_probability: Option<f64>,
}

impl CycleRow {
    pub fn top(marginal: &Marginal) -> (Option<String>, Option<f64>) {
        match marginal.most_likely() {
            Some((v, p)) => (Some(v.to_string()), Some(p)),
            None => (None, None),
        }
    }
}

fn value_cell(value: &Extended) -> String {
    match value {
        Extended::Regular(v) => v.to_string(),
        Extended::Star => "* (unexpanded)".to_string(),
    }
}

pub fn format_solution_text(label: &str, solution: &Solution, target: ElementId) -> String {
    let Some(marginal) = solution.marginal(target) else {
        return format!("{}: no marginal at depth {}", label, solution.depth);
    };

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Value", "Probability"]);
    for (value, p) in marginal.iter() {
        table.add_row(vec![value_cell(value), format!("{:.6}", p)]);
    }

    let mut out = format!("{} at depth {}\n{}\n", label, solution.depth, table);
    out.push_str(&format!("unresolved mass: {:.6}", marginal.unresolved()));
    if let Some(mean) = marginal.expectation(Value::as_f64) {
        out.push_str(&format!("\nresolved mean:   {:.6}", mean));
    }
    out
}

pub fn format_solution_json(
    label: &str,
    solution: &Solution,
    target: ElementId,
) -> Result<String, InferenceError> {
    let marginal = solution.marginal(target);
    let distribution: Vec<serde_json::Value> = marginal
        .map(|m| {
            m.iter()
                .map(|(v, p)| json!({ "value": value_cell(v), "probability": p }))
                .collect()
        })
        .unwrap_or_default();
    Ok(serde_json::to_string_pretty(&json!({
        "model": label,
        "depth": solution.depth,
        "distribution": distribution,
        "unresolved": marginal.map(Marginal::unresolved),
        "mean": marginal.and_then(|m| m.expectation(Value::as_f64)),
    }))?)
}

pub fn format_cycles_text(label: &str, rows: &[CycleRow]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Cycle",
        "Depth",
        "Components",
        "Problems",
        "Placeholders",
        "Digest",
        "Unresolved",
        "Top value",
    ]);
    for row in rows {
        let top = match (&row.top_value, row.top_probability) {
            (Some(v), Some(p)) => format!("{} ({:.4})", v, p),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            row.cycle.to_string(),
            row.depth.to_string(),
            row.components.to_string(),
            row.problems.to_string(),
            row.placeholders.to_string(),
            row.fingerprint.clone(),
            format!("{:.6}", row.unresolved),
            top,
        ]);
    }
    format!("{}\n{}", label, table)
}

pub fn format_cycles_json(label: &str, rows: &[CycleRow]) -> Result<String, InferenceError> {
    Ok(serde_json::to_string_pretty(&json!({
        "model": label,
        "cycles": rows,
    }))?)
}

pub fn format_models_text(demos: &[Demo]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Model", "Description"]);
    for demo in demos {
        table.add_row(vec![demo.name, demo.description]);
    }
    table.to_string()
}
