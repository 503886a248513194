//! CLI domain: parse, route, output, and presentation only.
//! Inference itself lives in the library; the route table only drives it.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_cycles_json, format_cycles_text, format_models_text, format_solution_json,
    format_solution_text, CycleRow,
};
pub use route::RunContext;
