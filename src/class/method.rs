//! Original method bodies and the handles that reach them.

use crate::class::Object;
use crate::dispatcher::Dispatcher;
use crate::error::{AspectError, Result};
use crate::types::{Arguments, Value};
use std::fmt;
use std::sync::Arc;

/// Body of an original method
pub type MethodBody = Arc<dyn Fn(&Invocation<'_>) -> Result<Value> + Send + Sync>;

/// An unwrapped method as declared on its class
pub struct Method {
    class_name: String,
    name: String,
    params: Vec<String>,
    body: MethodBody,
}

impl Method {
    pub fn new(
        class_name: impl Into<String>,
        name: impl Into<String>,
        params: Vec<String>,
        body: MethodBody,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            params,
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the class that declared this method
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.name)
    }

    /// Declared parameter names in order, receiver excluded
    pub fn parameter_names(&self) -> &[String] {
        &self.params
    }

    /// Run the body directly, bypassing any dispatcher
    pub fn invoke(&self, receiver: &Object, args: &Arguments) -> Result<Value> {
        (self.body)(&Invocation {
            receiver,
            method: self,
            args,
        })
    }

    /// Look up an actual argument by declared parameter name.
    ///
    /// Positional values are matched to parameter names first; a value
    /// passed by keyword is used when no positional value covers the name.
    pub fn lookup_arg<'a>(&self, args: &'a Arguments, name: &str) -> Result<&'a Value> {
        let positional = self
            .params
            .iter()
            .position(|param| param == name)
            .and_then(|index| args.get(index));

        positional
            .or_else(|| args.named(name))
            .ok_or_else(|| AspectError::ArgumentNotFound {
                method: self.qualified_name(),
                name: name.to_string(),
            })
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.qualified_name())
            .field("params", &self.params)
            .finish()
    }
}

/// A callable entry in a class's method table.
///
/// Either the raw method, or the dispatcher installed in front of it. Both
/// give access to the unwrapped original through [`MethodRef::original`].
#[derive(Clone)]
pub enum MethodRef {
    Raw(Arc<Method>),
    Wrapped(Arc<Dispatcher>),
}

impl MethodRef {
    pub fn original(&self) -> &Arc<Method> {
        match self {
            MethodRef::Raw(method) => method,
            MethodRef::Wrapped(dispatcher) => dispatcher.method(),
        }
    }

    pub fn name(&self) -> &str {
        self.original().name()
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, MethodRef::Wrapped(_))
    }

    /// Call through this handle, running advice when it is wrapped
    pub fn invoke(&self, receiver: &Object, args: Arguments) -> Result<Value> {
        match self {
            MethodRef::Raw(method) => method.invoke(receiver, &args),
            MethodRef::Wrapped(dispatcher) => dispatcher.dispatch(receiver, args),
        }
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodRef::Raw(method) => write!(f, "Raw({})", method.qualified_name()),
            MethodRef::Wrapped(dispatcher) => {
                write!(f, "Wrapped({})", dispatcher.method().qualified_name())
            }
        }
    }
}

/// What a method body sees when it runs
pub struct Invocation<'a> {
    receiver: &'a Object,
    method: &'a Method,
    args: &'a Arguments,
}

impl<'a> Invocation<'a> {
    pub fn receiver(&self) -> &'a Object {
        self.receiver
    }

    pub fn method(&self) -> &'a Method {
        self.method
    }

    pub fn args(&self) -> &'a Arguments {
        self.args
    }

    pub fn arg(&self, name: &str) -> Result<&'a Value> {
        self.method.lookup_arg(self.args, name)
    }

    /// Call another method on the same receiver, through its dispatcher
    pub fn call_self(&self, method: &str, args: impl Into<Arguments>) -> Result<Value> {
        self.receiver.call(method, args)
    }
}
