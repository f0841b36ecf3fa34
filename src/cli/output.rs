//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::AspectError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &AspectError) -> String {
    match e {
        AspectError::Config(msg) => format!("configuration error: {}", msg),
        other => other.to_string(),
    }
}
