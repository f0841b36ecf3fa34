//! Invocation context handed to pointcuts and advice.
//!
//! One context exists per phase per invocation. Only around contexts carry a
//! continuation: the ordered advice still eligible to run, ending in the
//! original method body.

use crate::class::{Class, Method, MethodRef, Object};
use crate::error::{AspectError, Result};
use crate::pointcut::Pointcut;
use crate::types::{Arguments, Phase, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

struct Continuation {
    links: Vec<Pointcut>,
    cursor: usize,
}

pub struct Context {
    phase: Phase,
    receiver: Object,
    method: MethodRef,
    args: Arguments,
    continuation: Option<Continuation>,
}

impl Context {
    pub fn new(phase: Phase, receiver: Object, method: MethodRef, args: Arguments) -> Self {
        Self {
            phase,
            receiver,
            method,
            args,
            continuation: None,
        }
    }

    /// Install the matched around advice, outermost first
    pub(crate) fn install_continuation(&mut self, links: Vec<Pointcut>) {
        self.continuation = Some(Continuation { links, cursor: 0 });
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn receiver(&self) -> &Object {
        &self.receiver
    }

    pub fn receiver_class(&self) -> &Arc<Class> {
        self.receiver.class()
    }

    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// The unwrapped method, whether or not a dispatcher sits in front of it
    pub fn original_method(&self) -> &Arc<Method> {
        self.method.original()
    }

    pub fn method_name(&self) -> &str {
        self.method.name()
    }

    /// Current arguments; around advice may have replaced them
    pub fn args(&self) -> &Arguments {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Result<&Value> {
        self.method.original().lookup_arg(&self.args, name)
    }

    pub fn has_continuation(&self) -> bool {
        self.continuation.is_some()
    }

    /// Advice links not yet entered, zero outside around contexts
    pub fn remaining(&self) -> usize {
        self.continuation
            .as_ref()
            .map(|c| c.links.len() - c.cursor)
            .unwrap_or(0)
    }

    /// Continue the around chain with `args`.
    ///
    /// Runs the next matched advice, or the original method once the chain
    /// is exhausted. Fails outside the around phase.
    pub fn proceed(&mut self, args: impl Into<Arguments>) -> Result<Value> {
        if self.continuation.is_none() {
            debug!(
                phase = %self.phase,
                method = %self.original_method().qualified_name(),
                "proceed called without a continuation"
            );
            return Err(AspectError::InvalidContinuation(self.phase));
        }
        self.args = args.into();

        match self.advance() {
            Some((position, link)) => {
                let result = link.execute_advice(self);
                self.rewind(position);
                result
            }
            None => self.method.original().invoke(&self.receiver, &self.args),
        }
    }

    /// Continue the around chain with the current arguments
    pub fn proceed_unchanged(&mut self) -> Result<Value> {
        let args = self.args.clone();
        self.proceed(args)
    }

    fn advance(&mut self) -> Option<(usize, Pointcut)> {
        let continuation = self.continuation.as_mut()?;
        let position = continuation.cursor;
        let link = continuation.links.get(position)?.clone();
        continuation.cursor = position + 1;
        Some((position, link))
    }

    // A second proceed from the same advice re-enters the inner links.
    fn rewind(&mut self, position: usize) {
        if let Some(continuation) = self.continuation.as_mut() {
            continuation.cursor = position;
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("phase", &self.phase)
            .field("receiver", &self.receiver)
            .field("method", &self.method)
            .field("args", &self.args)
            .field("remaining", &self.remaining())
            .finish()
    }
}
