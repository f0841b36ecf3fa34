//! Control-flow pointcuts and their per-thread nesting depth.

use crate::context::Context;
use crate::pointcut::Pointcut;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::thread::{self, ThreadId};

/// Nesting depth of a control-flow pointcut, kept per call stack.
///
/// Each thread has its own counter, so concurrent call stacks never observe
/// each other's nesting.
#[derive(Debug, Default)]
pub struct FlowDepth {
    levels: Mutex<HashMap<ThreadId, usize>>,
}

impl FlowDepth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth on the calling thread
    pub fn current(&self) -> usize {
        self.levels
            .lock()
            .get(&thread::current().id())
            .copied()
            .unwrap_or(0)
    }

    pub fn enter(&self) {
        *self.levels.lock().entry(thread::current().id()).or_insert(0) += 1;
    }

    pub fn leave(&self) {
        let mut levels = self.levels.lock();
        let id = thread::current().id();
        if let Some(level) = levels.get_mut(&id) {
            *level = level.saturating_sub(1);
            if *level == 0 {
                levels.remove(&id);
            }
        }
    }
}

pub struct ControlFlow {
    inner: Pointcut,
    threshold: usize,
    depth: FlowDepth,
}

impl ControlFlow {
    pub(crate) fn new(inner: Pointcut, threshold: usize) -> Self {
        Self {
            inner,
            threshold,
            depth: FlowDepth::new(),
        }
    }

    pub fn inner(&self) -> &Pointcut {
        &self.inner
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn depth(&self) -> usize {
        self.depth.current()
    }

    pub(crate) fn copy(&self) -> Self {
        Self::new(self.inner.copy(), self.threshold)
    }

    pub(crate) fn is_advisable(&self) -> bool {
        self.depth.current() > self.threshold
    }

    pub(crate) fn notify_before(&self, ctx: &Context) {
        self.inner.notify_before(ctx);
        if self.inner.is_advisable(ctx) {
            self.depth.enter();
        }
    }

    // The inner is checked before it unwinds, so the check sees the same
    // state the matching notify_before saw.
    pub(crate) fn notify_after(&self, ctx: &Context) {
        let matched = self.inner.is_advisable(ctx);
        self.inner.notify_after(ctx);
        if matched {
            self.depth.leave();
        }
    }
}
