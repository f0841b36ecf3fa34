//! Weaver CLI Binary
//!
//! Runs the advice demos from the command line.

use clap::Parser;
use std::process;
use tracing::{error, info};
use weaver::cli::{map_error, Cli, RunContext};
use weaver::config::{ConfigLoader, WeaverConfig};
use weaver::logging::init_logging;

fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    let config = apply_cli_overrides(config, &cli);

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Weaver CLI starting");

    let context = RunContext::new(&config);

    match context.execute(&cli.command) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// CLI flags override the loaded configuration
fn apply_cli_overrides(mut config: WeaverConfig, cli: &Cli) -> WeaverConfig {
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.logging.output = output.clone();
    }
    config
}
