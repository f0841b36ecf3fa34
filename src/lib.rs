//! Weaver: before, around and after advice for method invocations.
//!
//! Methods of classes built through a [`Weaver`] are intercepted by a
//! [`Dispatcher`]. Each invocation is split into before, around and after
//! phases; registered [`Pointcut`]s decide which advice takes part, and
//! around advice forms a chain that ends in the original method body.
//!
//! ```
//! use weaver::{Arguments, Object, Pointcut, Weaver};
//! use serde_json::json;
//!
//! let weaver = Weaver::new();
//! let math = weaver
//!     .class("Math")
//!     .method("double", &["n"], |inv| {
//!         Ok(json!(inv.arg("n")?.as_i64().unwrap_or_default() * 2))
//!     })
//!     .build();
//!
//! weaver
//!     .around(Pointcut::call(&math, "double"), |ctx| {
//!         let n = ctx.arg("n")?.as_i64().unwrap_or_default();
//!         ctx.proceed(Arguments::new().with(n + 1))
//!     })
//!     .unwrap();
//!
//! let m = Object::new(&math);
//! assert_eq!(m.call("double", Arguments::new().with(20)).unwrap(), json!(42));
//! ```

pub mod class;
pub mod cli;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod pointcut;
pub mod registry;
pub mod types;
pub mod weaver;

pub use class::{Class, ClassBuilder, ClassId, Invocation, Method, MethodRef, Object};
pub use context::Context;
pub use dispatcher::{DispatchOptions, Dispatcher};
pub use error::{AspectError, Result};
pub use pointcut::{Advice, Pointcut, PointcutKind, Predicate};
pub use registry::{AdviceBinding, Registry};
pub use types::{Arguments, Phase, Value};
pub use weaver::Weaver;
