//! Pointcuts: predicates over invocation contexts.
//!
//! A [`Pointcut`] is a shared handle; cloning it aliases the same instance,
//! including any attached advice and any control-flow depth. Use
//! [`Pointcut::copy`] to get an independent instance before registering an
//! equivalent pointcut a second time.
//!
//! Notifications (`notify_before` / `notify_after`) are delivered by the
//! dispatcher for every invocation and flow through combinators to every
//! child unconditionally, so nested control-flow pointcuts always see the
//! full call stack.

use crate::class::{Class, ClassId};
use crate::context::Context;
use crate::error::{AspectError, Result};
use crate::types::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

mod flow;
mod predicate;

pub use flow::{ControlFlow, FlowDepth};
pub use predicate::Predicate;

/// Advice function attached to a pointcut
pub type Advice = Arc<dyn Fn(&mut Context) -> Result<Value> + Send + Sync>;

/// Target of a `call` pointcut.
///
/// Holds the class by id, not by handle: the class's dispatchers reach this
/// pointcut through the registry, so a strong handle would keep both alive.
#[derive(Debug, Clone)]
pub struct CallTarget {
    class_id: ClassId,
    class_name: String,
    method: String,
}

impl CallTarget {
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    fn matches(&self, ctx: &Context) -> bool {
        self.method == ctx.method_name() && ctx.receiver_class().descends_from(self.class_id)
    }
}

pub enum PointcutKind {
    Call(CallTarget),
    And(Pointcut, Pointcut),
    Or(Pointcut, Pointcut),
    Not(Pointcut),
    CFlow(ControlFlow),
    Predicate(Arc<dyn Predicate>),
}

struct Node {
    kind: PointcutKind,
    advice: OnceLock<Advice>,
}

#[derive(Clone)]
pub struct Pointcut {
    node: Arc<Node>,
}

impl Pointcut {
    fn new(kind: PointcutKind) -> Self {
        Self {
            node: Arc::new(Node {
                kind,
                advice: OnceLock::new(),
            }),
        }
    }

    /// Matches calls of `method` on instances of `class` or its subclasses
    pub fn call(class: &Arc<Class>, method: impl Into<String>) -> Self {
        Self::new(PointcutKind::Call(CallTarget {
            class_id: class.id(),
            class_name: class.name().to_string(),
            method: method.into(),
        }))
    }

    /// Wrap a user-defined predicate
    pub fn predicate<P: Predicate + 'static>(predicate: P) -> Self {
        Self::new(PointcutKind::Predicate(Arc::new(predicate)))
    }

    /// Matches anywhere inside an invocation matched by `inner`, including
    /// that invocation itself
    pub fn cflow(inner: Pointcut) -> Self {
        Self::cflow_with_threshold(inner, 0)
    }

    /// Matches only invocations nested strictly below one matched by `inner`
    pub fn cflow_below(inner: Pointcut) -> Self {
        Self::cflow_with_threshold(inner, 1)
    }

    pub fn cflow_with_threshold(inner: Pointcut, threshold: usize) -> Self {
        Self::new(PointcutKind::CFlow(ControlFlow::new(inner, threshold)))
    }

    pub fn and(self, other: Pointcut) -> Self {
        Self::new(PointcutKind::And(self, other))
    }

    pub fn or(self, other: Pointcut) -> Self {
        Self::new(PointcutKind::Or(self, other))
    }

    pub fn negate(self) -> Self {
        Self::new(PointcutKind::Not(self))
    }

    pub fn kind(&self) -> &PointcutKind {
        &self.node.kind
    }

    /// Structural duplicate with fresh flow state and no advice
    pub fn copy(&self) -> Self {
        let kind = match &self.node.kind {
            PointcutKind::Call(target) => PointcutKind::Call(target.clone()),
            PointcutKind::And(left, right) => PointcutKind::And(left.copy(), right.copy()),
            PointcutKind::Or(left, right) => PointcutKind::Or(left.copy(), right.copy()),
            PointcutKind::Not(inner) => PointcutKind::Not(inner.copy()),
            PointcutKind::CFlow(flow) => PointcutKind::CFlow(flow.copy()),
            PointcutKind::Predicate(predicate) => PointcutKind::Predicate(predicate.duplicate()),
        };
        Self::new(kind)
    }

    pub fn is_advisable(&self, ctx: &Context) -> bool {
        match &self.node.kind {
            PointcutKind::Call(target) => target.matches(ctx),
            // Both sides are evaluated; no short-circuit.
            PointcutKind::And(left, right) => {
                let l = left.is_advisable(ctx);
                let r = right.is_advisable(ctx);
                l && r
            }
            PointcutKind::Or(left, right) => {
                let l = left.is_advisable(ctx);
                let r = right.is_advisable(ctx);
                l || r
            }
            PointcutKind::Not(inner) => !inner.is_advisable(ctx),
            PointcutKind::CFlow(flow) => flow.is_advisable(),
            PointcutKind::Predicate(predicate) => predicate.is_advisable(ctx),
        }
    }

    pub fn notify_before(&self, ctx: &Context) {
        match &self.node.kind {
            PointcutKind::Call(_) => {}
            PointcutKind::And(left, right) | PointcutKind::Or(left, right) => {
                left.notify_before(ctx);
                right.notify_before(ctx);
            }
            PointcutKind::Not(inner) => inner.notify_before(ctx),
            PointcutKind::CFlow(flow) => flow.notify_before(ctx),
            PointcutKind::Predicate(predicate) => predicate.notify_before(ctx),
        }
    }

    pub fn notify_after(&self, ctx: &Context) {
        match &self.node.kind {
            PointcutKind::Call(_) => {}
            PointcutKind::And(left, right) | PointcutKind::Or(left, right) => {
                left.notify_after(ctx);
                right.notify_after(ctx);
            }
            PointcutKind::Not(inner) => inner.notify_after(ctx),
            PointcutKind::CFlow(flow) => flow.notify_after(ctx),
            PointcutKind::Predicate(predicate) => predicate.notify_after(ctx),
        }
    }

    /// Attach advice. A pointcut carries at most one advice.
    pub fn set_advice<F>(&self, advice: F) -> Result<()>
    where
        F: Fn(&mut Context) -> Result<Value> + Send + Sync + 'static,
    {
        self.attach(Arc::new(advice))
    }

    pub(crate) fn attach(&self, advice: Advice) -> Result<()> {
        self.node
            .advice
            .set(advice)
            .map_err(|_| AspectError::BindingConflict(self.to_string()))
    }

    pub fn has_advice(&self) -> bool {
        self.node.advice.get().is_some()
    }

    pub fn execute_advice(&self, ctx: &mut Context) -> Result<Value> {
        let advice = self
            .node
            .advice
            .get()
            .ok_or_else(|| AspectError::Unbound(self.to_string()))?;
        advice(ctx)
    }

    /// Whether both handles refer to the same instance
    pub fn ptr_eq(&self, other: &Pointcut) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Display for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node.kind {
            PointcutKind::Call(target) => {
                write!(f, "call({}.{})", target.class_name, target.method)
            }
            PointcutKind::And(left, right) => write!(f, "and({left}, {right})"),
            PointcutKind::Or(left, right) => write!(f, "or({left}, {right})"),
            PointcutKind::Not(inner) => write!(f, "not({inner})"),
            PointcutKind::CFlow(flow) => match flow.threshold() {
                0 => write!(f, "cflow({})", flow.inner()),
                1 => write!(f, "cflow_below({})", flow.inner()),
                n => write!(f, "cflow({}, threshold={n})", flow.inner()),
            },
            PointcutKind::Predicate(predicate) => {
                write!(f, "predicate({})", predicate.describe())
            }
        }
    }
}

impl fmt::Debug for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointcut({self})")
    }
}
