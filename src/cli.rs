//! CLI domain: parse, route and output for the `weaver` demo binary.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use route::{fibonacci, FibOptions, FibReport, RunContext, MAX_FIB_INDEX};
