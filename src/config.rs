//! Configuration System
//!
//! Layered configuration for dispatch behavior and logging, loaded with the
//! `config` crate: defaults, the user config file, an optional explicit file,
//! then `WEAVER__*` environment variables.

use crate::dispatcher::DispatchOptions;
use crate::error::AspectError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaverConfig {
    /// Dispatcher settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dispatcher settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Emit a trace span and per-phase events for every intercepted call
    #[serde(default)]
    pub trace: bool,
}

impl DispatchConfig {
    pub fn options(&self) -> DispatchOptions {
        DispatchOptions { trace: self.trace }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl WeaverConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into a single configuration error
    pub fn ensure_valid(&self) -> Result<(), AspectError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            AspectError::Config(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
