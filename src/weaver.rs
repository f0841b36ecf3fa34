//! Weaver: owns a registry and instruments classes against it.
//!
//! Each weaver is an independent advice scope. Classes built through
//! [`Weaver::class`] consult only that weaver's registry, so tests (or
//! subsystems) can keep their advice apart.

use crate::class::ClassBuilder;
use crate::config::WeaverConfig;
use crate::context::Context;
use crate::dispatcher::{DispatchOptions, Interception};
use crate::error::Result;
use crate::pointcut::Pointcut;
use crate::registry::Registry;
use crate::types::Value;
use std::sync::Arc;

pub struct Weaver {
    interception: Interception,
}

impl Weaver {
    pub fn new() -> Self {
        Self::with_options(DispatchOptions::default())
    }

    pub fn with_options(options: DispatchOptions) -> Self {
        Self {
            interception: Interception::new(Arc::new(Registry::new()), options),
        }
    }

    pub fn from_config(config: &WeaverConfig) -> Self {
        Self::with_options(config.dispatch.options())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.interception.registry()
    }

    pub fn options(&self) -> DispatchOptions {
        self.interception.options()
    }

    /// Start an advisable class whose methods dispatch through this weaver
    pub fn class(&self, name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name, Some(self.interception.clone()))
    }

    pub fn before<F>(&self, pointcut: Pointcut, advice: F) -> Result<()>
    where
        F: Fn(&mut Context) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry().before(pointcut, advice)
    }

    pub fn after<F>(&self, pointcut: Pointcut, advice: F) -> Result<()>
    where
        F: Fn(&mut Context) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry().after(pointcut, advice)
    }

    pub fn around<F>(&self, pointcut: Pointcut, advice: F) -> Result<()>
    where
        F: Fn(&mut Context) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry().around(pointcut, advice)
    }
}

impl Default for Weaver {
    fn default() -> Self {
        Self::new()
    }
}
