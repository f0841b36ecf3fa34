//! Classes opting into interception.
//!
//! A [`Class`] is an explicit method table. Building it through a
//! [`crate::Weaver`] wraps every declared method in a [`Dispatcher`], so calls
//! made through [`Object::call`] run the before/around/after protocol. Classes
//! built with [`Class::plain`] dispatch directly to the method bodies unless
//! they extend an advisable base, in which case they inherit its registry.

use crate::dispatcher::{Dispatcher, Interception};
use crate::error::Result;
use crate::types::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

mod method;
mod object;

pub use method::{Invocation, Method, MethodBody, MethodRef};
pub use object::Object;

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique class identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub struct Class {
    id: ClassId,
    name: String,
    base: Option<Arc<Class>>,
    methods: HashMap<String, MethodRef>,
    interception: Option<Interception>,
}

impl Class {
    /// Start a class whose methods are called without interception
    pub fn plain(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name, None)
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&Arc<Class>> {
        self.base.as_ref()
    }

    /// Whether this class's methods run through a dispatcher
    pub fn is_advisable(&self) -> bool {
        self.interception.is_some()
    }

    /// True when `other` is this class or one of its ancestors
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.descends_from(other.id)
    }

    /// True when the class identified by `id` is this class or an ancestor
    pub fn descends_from(&self, id: ClassId) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.id == id {
                return true;
            }
            current = class.base.as_deref();
        }
        false
    }

    /// Method declared directly on this class
    pub fn declared(&self, method: &str) -> Option<&MethodRef> {
        self.methods.get(method)
    }

    /// Resolve a method on this class or the nearest ancestor declaring it
    pub fn resolve(&self, method: &str) -> Option<&MethodRef> {
        let mut current = Some(self);
        while let Some(class) = current {
            if let Some(found) = class.methods.get(method) {
                return Some(found);
            }
            current = class.base.as_deref();
        }
        None
    }

    /// Names of methods declared directly on this class, sorted
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("base", &self.base.as_ref().map(|b| b.name.as_str()))
            .field("methods", &self.method_names())
            .field("advisable", &self.is_advisable())
            .finish()
    }
}

/// Builder that installs a dispatcher in front of each declared method
pub struct ClassBuilder {
    name: String,
    base: Option<Arc<Class>>,
    methods: Vec<Method>,
    interception: Option<Interception>,
}

impl ClassBuilder {
    pub(crate) fn new(name: impl Into<String>, interception: Option<Interception>) -> Self {
        Self {
            name: name.into(),
            base: None,
            methods: Vec::new(),
            interception,
        }
    }

    /// Inherit methods from `base`. A plain builder extending an advisable
    /// base becomes advisable through the base's registry.
    pub fn extends(mut self, base: &Arc<Class>) -> Self {
        if self.interception.is_none() {
            self.interception = base.interception.clone();
        }
        self.base = Some(Arc::clone(base));
        self
    }

    /// Declare a method. `params` are the parameter names after the receiver.
    pub fn method<F>(mut self, name: &str, params: &[&str], body: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        let params = params.iter().map(|p| p.to_string()).collect();
        self.methods
            .push(Method::new(self.name.clone(), name, params, Arc::new(body)));
        self
    }

    pub fn build(self) -> Arc<Class> {
        let interception = self.interception;
        let methods = self
            .methods
            .into_iter()
            .map(|method| {
                let method = Arc::new(method);
                let handle = match &interception {
                    Some(interception) => MethodRef::Wrapped(Arc::new(Dispatcher::new(
                        method.clone(),
                        interception.clone(),
                    ))),
                    None => MethodRef::Raw(method.clone()),
                };
                (method.name().to_string(), handle)
            })
            .collect();

        Arc::new(Class {
            id: ClassId::next(),
            name: self.name,
            base: self.base,
            methods,
            interception,
        })
    }
}
