//! Logging System
//!
//! Structured logging using the `tracing` crate. The library itself only emits
//! events; binaries and tests call [`init_logging`] to install a subscriber
//! with the configured level, format and destination.

use crate::error::AspectError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (if output is "file"); defaults under the platform state directory
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format only, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Validate level, format and output values
    pub fn validate(&self) -> Result<(), String> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(format!(
                "Invalid log level: {} (must be one of {})",
                self.level,
                LEVELS.join(", ")
            ));
        }
        parse_format(&self.format)?;
        parse_output(&self.output)?;
        for (module, level) in &self.modules {
            if !LEVELS.contains(&level.as_str()) {
                return Err(format!("Invalid log level for module {}: {}", module, level));
            }
        }
        Ok(())
    }
}

/// Default log file: $XDG_STATE_HOME/weaver/weaver.log or the platform equivalent
pub fn default_log_file() -> PathBuf {
    directories::ProjectDirs::from("", "", "weaver")
        .map(|dirs| {
            dirs.state_dir()
                .unwrap_or_else(|| dirs.data_local_dir())
                .join("weaver.log")
        })
        .unwrap_or_else(|| PathBuf::from("weaver.log"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
    File,
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. Environment variables (WEAVER_LOG, WEAVER_LOG_FORMAT, WEAVER_LOG_OUTPUT, WEAVER_LOG_MODULES)
/// 2. Configuration
/// 3. Defaults
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), AspectError> {
    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let use_color = config.map(|c| c.color).unwrap_or(true) && output != Output::File;

    let writer = match output {
        Output::Stdout => BoxMakeWriter::new(std::io::stdout),
        Output::Stderr => BoxMakeWriter::new(std::io::stderr),
        Output::File => {
            let log_file = config
                .and_then(|c| c.file.clone())
                .unwrap_or_else(default_log_file);
            BoxMakeWriter::new(std::sync::Mutex::new(open_log_file(&log_file)?))
        }
    };

    let base_subscriber = Registry::default().with(filter);
    let installed = match format {
        Format::Json => base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        Format::Text => base_subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(writer),
            )
            .try_init(),
    };

    installed.map_err(|e| AspectError::Config(format!("Failed to install logger: {}", e)))
}

fn open_log_file(log_file: &std::path::Path) -> Result<std::fs::File, AspectError> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AspectError::Config(format!("Failed to create log directory: {}", e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| AspectError::Config(format!("Failed to open log file {:?}: {}", log_file, e)))
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, AspectError> {
    if let Ok(filter) = EnvFilter::try_from_env("WEAVER_LOG") {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(level);

    if let Some(config) = config {
        for (module, module_level) in &config.modules {
            let directive = format!("{}={}", module, module_level);
            filter = filter.add_directive(directive.parse().map_err(|e| {
                AspectError::Config(format!("Invalid log directive: {}", e))
            })?);
        }
    }

    if let Ok(modules_str) = std::env::var("WEAVER_LOG_MODULES") {
        for module_spec in modules_str.split(',') {
            let parts: Vec<&str> = module_spec.split('=').collect();
            if parts.len() == 2 {
                let directive = format!("{}={}", parts[0].trim(), parts[1].trim());
                filter = filter.add_directive(directive.parse().map_err(|e| {
                    AspectError::Config(format!("Invalid log directive from env: {}", e))
                })?);
            }
        }
    }

    Ok(filter)
}

fn determine_format(config: Option<&LoggingConfig>) -> Result<Format, AspectError> {
    if let Ok(format) = std::env::var("WEAVER_LOG_FORMAT") {
        if let Ok(format) = parse_format(&format) {
            return Ok(format);
        }
    }
    parse_format(config.map(|c| c.format.as_str()).unwrap_or("text")).map_err(AspectError::Config)
}

fn determine_output(config: Option<&LoggingConfig>) -> Result<Output, AspectError> {
    if let Ok(output) = std::env::var("WEAVER_LOG_OUTPUT") {
        return parse_output(&output).map_err(AspectError::Config);
    }
    parse_output(config.map(|c| c.output.as_str()).unwrap_or("stderr")).map_err(AspectError::Config)
}

fn parse_format(format: &str) -> Result<Format, String> {
    match format {
        "json" => Ok(Format::Json),
        "text" => Ok(Format::Text),
        _ => Err(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )),
    }
}

fn parse_output(output: &str) -> Result<Output, String> {
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        "file" => Ok(Output::File),
        _ => Err(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr' or 'file')",
            output
        )),
    }
}
