//! Error types for the weaver advice system.

use crate::types::Phase;
use thiserror::Error;

/// Errors surfaced by registration, dispatch and argument lookup
#[derive(Debug, Error)]
pub enum AspectError {
    #[error("Binding conflict: pointcut {0} already has advice attached")]
    BindingConflict(String),

    #[error("Invalid continuation: proceed called from {0} advice, only around advice may proceed")]
    InvalidContinuation(Phase),

    #[error("Argument not found: method '{method}' has no argument named '{name}'")]
    ArgumentNotFound { method: String, name: String },

    #[error("Method not found: class '{class}' has no method '{method}'")]
    MethodNotFound { class: String, method: String },

    #[error("Pointcut {0} has no advice attached")]
    Unbound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure raised by a method body or by advice. Dispatch never wraps it.
    #[error(transparent)]
    Raised(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AspectError {
    fn from(err: config::ConfigError) -> Self {
        AspectError::Config(err.to_string())
    }
}

pub type Result<T, E = AspectError> = std::result::Result<T, E>;
