//! Advice registry: the ordered list of bindings consulted on every dispatch.
//!
//! Registration order is the only ordering key. Bindings are never removed;
//! a registry lives as long as the weaver (and classes) that share it.

use crate::context::Context;
use crate::error::Result;
use crate::pointcut::{Advice, Pointcut};
use crate::types::{Phase, Value};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// One pointcut registered for one phase. The advice lives on the pointcut.
#[derive(Clone)]
pub struct AdviceBinding {
    sequence: usize,
    phase: Phase,
    pointcut: Pointcut,
}

impl AdviceBinding {
    /// Position in registration order
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    /// Whether this binding joins the around chain for `ctx`
    pub fn is_advisable(&self, ctx: &Context) -> bool {
        ctx.phase() == self.phase && self.pointcut.is_advisable(ctx)
    }

    /// Deliver a before event; run the advice if this is a before binding
    pub fn notify_before(&self, ctx: &mut Context) -> Result<()> {
        self.pointcut.notify_before(ctx);
        self.run_if(Phase::Before, ctx)
    }

    /// Deliver an after event; run the advice if this is an after binding
    pub fn notify_after(&self, ctx: &mut Context) -> Result<()> {
        self.pointcut.notify_after(ctx);
        self.run_if(Phase::After, ctx)
    }

    fn run_if(&self, phase: Phase, ctx: &mut Context) -> Result<()> {
        if self.phase == phase && self.pointcut.is_advisable(ctx) {
            self.pointcut.execute_advice(ctx)?;
        }
        Ok(())
    }
}

impl fmt::Debug for AdviceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdviceBinding")
            .field("sequence", &self.sequence)
            .field("phase", &self.phase)
            .field("pointcut", &self.pointcut)
            .finish()
    }
}

#[derive(Default)]
pub struct Registry {
    bindings: RwLock<Vec<AdviceBinding>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `advice` before every invocation matched by `pointcut`
    pub fn before<F>(&self, pointcut: Pointcut, advice: F) -> Result<()>
    where
        F: Fn(&mut Context) -> Result<Value> + Send + Sync + 'static,
    {
        self.bind(Phase::Before, pointcut, Arc::new(advice))
    }

    /// Run `advice` after every invocation matched by `pointcut` that returned
    pub fn after<F>(&self, pointcut: Pointcut, advice: F) -> Result<()>
    where
        F: Fn(&mut Context) -> Result<Value> + Send + Sync + 'static,
    {
        self.bind(Phase::After, pointcut, Arc::new(advice))
    }

    /// Run `advice` in place of every invocation matched by `pointcut`; the
    /// advice reaches the original method through `Context::proceed`
    pub fn around<F>(&self, pointcut: Pointcut, advice: F) -> Result<()>
    where
        F: Fn(&mut Context) -> Result<Value> + Send + Sync + 'static,
    {
        self.bind(Phase::Around, pointcut, Arc::new(advice))
    }

    /// Attach `advice` to `pointcut` and append the binding.
    ///
    /// Fails without registering anything if the pointcut already has advice.
    pub fn bind(&self, phase: Phase, pointcut: Pointcut, advice: Advice) -> Result<()> {
        pointcut.attach(advice)?;

        let mut bindings = self.bindings.write();
        let sequence = bindings.len();
        debug!(sequence, phase = %phase, pointcut = %pointcut, "Advice registered");
        bindings.push(AdviceBinding {
            sequence,
            phase,
            pointcut,
        });
        Ok(())
    }

    /// Bindings in registration order, as of now
    pub fn snapshot(&self) -> Vec<AdviceBinding> {
        self.bindings.read().clone()
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("bindings", &*self.bindings.read())
            .finish()
    }
}
