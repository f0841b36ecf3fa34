//! Invocation dispatcher.
//!
//! A [`Dispatcher`] sits in front of exactly one original method. Every call
//! runs three phases against a snapshot of the registry:
//!
//! 1. before: every binding's pointcut is notified; before advice runs where
//!    its pointcut matches.
//! 2. around: matching around bindings form the continuation chain, which
//!    ends in the original method. Its value is the call's result.
//! 3. after: every binding's pointcut is notified with the original
//!    arguments; after advice runs where its pointcut matches.
//!
//! Failures from advice or the method body propagate unchanged and skip the
//! remaining advice. Pointcuts that were notified of the before event still
//! receive the after event, so control-flow depth stays balanced.

use crate::class::{Method, MethodRef, Object};
use crate::context::Context;
use crate::error::Result;
use crate::pointcut::Pointcut;
use crate::registry::{AdviceBinding, Registry};
use crate::types::{Arguments, Phase, Value};
use std::sync::Arc;
use tracing::{trace, trace_span};

/// Per-dispatcher behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Emit a span and per-phase trace events for every invocation
    pub trace: bool,
}

/// Registry and options shared by all dispatchers of a weaver
#[derive(Clone)]
pub struct Interception {
    registry: Arc<Registry>,
    options: DispatchOptions,
}

impl Interception {
    pub fn new(registry: Arc<Registry>, options: DispatchOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }
}

pub struct Dispatcher {
    method: Arc<Method>,
    interception: Interception,
}

impl Dispatcher {
    pub fn new(method: Arc<Method>, interception: Interception) -> Self {
        Self {
            method,
            interception,
        }
    }

    /// The original, unwrapped method
    pub fn method(&self) -> &Arc<Method> {
        &self.method
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.interception.registry
    }

    /// Invoke the method on `receiver` through the advice protocol
    pub fn dispatch(self: &Arc<Self>, receiver: &Object, args: Arguments) -> Result<Value> {
        let tracing_enabled = self.interception.options.trace;
        let _span = tracing_enabled.then(|| {
            trace_span!("dispatch", method = %self.method.qualified_name()).entered()
        });

        let bindings = self.interception.registry.snapshot();
        let handle = MethodRef::Wrapped(Arc::clone(self));
        let context =
            |phase: Phase| Context::new(phase, receiver.clone(), handle.clone(), args.clone());

        let mut before = context(Phase::Before);
        for (index, binding) in bindings.iter().enumerate() {
            if let Err(err) = binding.notify_before(&mut before) {
                release_flow(&bindings[..=index], &context(Phase::After));
                return Err(err);
            }
        }

        let mut around = context(Phase::Around);
        let chain: Vec<Pointcut> = bindings
            .iter()
            .filter(|binding| binding.is_advisable(&around))
            .map(|binding| binding.pointcut().clone())
            .collect();
        if tracing_enabled {
            trace!(
                bindings = bindings.len(),
                chain = chain.len(),
                "Entering around phase"
            );
        }
        around.install_continuation(chain);
        let result = around.proceed(args.clone());

        let mut after = context(Phase::After);
        let value = match result {
            Ok(value) => value,
            Err(err) => {
                if tracing_enabled {
                    trace!(error = %err, "Around phase failed, skipping after advice");
                }
                release_flow(&bindings, &after);
                return Err(err);
            }
        };

        for (index, binding) in bindings.iter().enumerate() {
            if let Err(err) = binding.notify_after(&mut after) {
                release_flow(&bindings[index + 1..], &after);
                return Err(err);
            }
        }
        if tracing_enabled {
            trace!("Dispatch complete");
        }
        Ok(value)
    }
}

// Delivers the after event to pointcuts without running any advice.
fn release_flow(bindings: &[AdviceBinding], after: &Context) {
    for binding in bindings {
        binding.pointcut().notify_after(after);
    }
}
