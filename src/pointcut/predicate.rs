//! Extension point for user-defined pointcuts.

use crate::context::Context;
use std::sync::Arc;

/// A custom predicate over invocation contexts.
///
/// Implementations that keep state should update it only from the notify
/// hooks; `is_advisable` may be evaluated several times per phase.
pub trait Predicate: Send + Sync {
    fn is_advisable(&self, ctx: &Context) -> bool;

    fn notify_before(&self, _ctx: &Context) {}

    fn notify_after(&self, _ctx: &Context) {}

    /// Independent instance with fresh state, used by `Pointcut::copy`
    fn duplicate(&self) -> Arc<dyn Predicate>;

    fn describe(&self) -> String {
        "custom".to_string()
    }
}
