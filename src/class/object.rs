//! Receivers: class instances carrying opaque state.

use crate::class::Class;
use crate::error::{AspectError, Result};
use crate::types::{Arguments, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

struct ObjectInner {
    class: Arc<Class>,
    state: Box<dyn Any + Send + Sync>,
}

/// Shared handle to a class instance
#[derive(Clone)]
pub struct Object {
    inner: Arc<ObjectInner>,
}

impl Object {
    /// Instance with no state of its own
    pub fn new(class: &Arc<Class>) -> Self {
        Self::with_state(class, ())
    }

    pub fn with_state<T: Any + Send + Sync>(class: &Arc<Class>, state: T) -> Self {
        Self {
            inner: Arc::new(ObjectInner {
                class: Arc::clone(class),
                state: Box::new(state),
            }),
        }
    }

    /// Runtime class of this instance
    pub fn class(&self) -> &Arc<Class> {
        &self.inner.class
    }

    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.inner.class.is_subclass_of(class)
    }

    pub fn state<T: Any>(&self) -> Option<&T> {
        self.inner.state.downcast_ref::<T>()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Invoke a method resolved on the runtime class
    pub fn call(&self, method: &str, args: impl Into<Arguments>) -> Result<Value> {
        let handle = self
            .inner
            .class
            .resolve(method)
            .ok_or_else(|| AspectError::MethodNotFound {
                class: self.inner.class.name().to_string(),
                method: method.to_string(),
            })?;
        handle.invoke(self, args.into())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Object<{}>@{:p}",
            self.inner.class.name(),
            Arc::as_ptr(&self.inner)
        )
    }
}
