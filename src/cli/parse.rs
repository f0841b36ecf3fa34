//! CLI parse: clap types for weaver. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Weaver CLI - advice for method invocations
#[derive(Parser)]
#[command(name = "weaver")]
#[command(about = "Demonstrates before, around and after advice on intercepted methods")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the user config file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute a Fibonacci number through an advisable recursive method
    Fib {
        /// Which Fibonacci number to compute (at most 93, the largest that fits in u64)
        #[arg(value_parser = clap::value_parser!(u32).range(0..=93))]
        n: u32,
        /// Memoize results with an around advice
        #[arg(long)]
        cache: bool,
        /// Log entry and exit of every intercepted call
        #[arg(long)]
        trace_calls: bool,
        /// Number of times to repeat the top-level call
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        repeat: u32,
    },
}
