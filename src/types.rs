//! Shared value types: invocation phases and argument sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use serde_json::Value;

/// Phase of a single method invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Before,
    Around,
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Before => "before",
            Phase::Around => "around",
            Phase::After => "after",
        };
        f.write_str(name)
    }
}

/// Actual arguments of one invocation.
///
/// Positional values map onto the method's declared parameter names in
/// order; named values carry everything passed by keyword.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub positional: Vec<Value>,
    #[serde(default)]
    pub named: BTreeMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add or replace a named argument
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: BTreeMap::new(),
        }
    }
}

impl From<()> for Arguments {
    fn from(_: ()) -> Self {
        Self::default()
    }
}
