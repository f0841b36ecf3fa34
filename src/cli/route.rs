//! CLI route: build the demo classes and run a command against a weaver.

use crate::class::{Class, Object};
use crate::cli::parse::Commands;
use crate::config::WeaverConfig;
use crate::error::Result;
use crate::pointcut::Pointcut;
use crate::types::{Arguments, Value};
use crate::weaver::Weaver;
use anyhow::anyhow;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Largest index whose Fibonacci number fits in a `u64`
pub const MAX_FIB_INDEX: u32 = 93;

/// Options for the Fibonacci demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FibOptions {
    pub n: u32,
    pub cache: bool,
    pub trace_calls: bool,
    pub repeat: u32,
}

/// Outcome of the Fibonacci demo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FibReport {
    pub n: u32,
    pub value: u64,
    /// How many times the method body ran
    pub executions: usize,
    /// Calls answered by the memo advice without reaching the body
    pub cache_hits: usize,
}

impl fmt::Display for FibReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fibonacci({}) = {}", self.n, self.value)?;
        writeln!(f, "body executions: {}", self.executions)?;
        write!(f, "cache hits: {}", self.cache_hits)
    }
}

struct FibState {
    executions: AtomicUsize,
}

/// Run the Fibonacci demo on `weaver`.
///
/// The method recurses through its own dispatcher, so every level of the
/// recursion is visible to advice.
pub fn fibonacci(weaver: &Weaver, options: FibOptions) -> Result<FibReport> {
    // Checked before dispatch: the recursion is n levels deep.
    if options.n > MAX_FIB_INDEX {
        return Err(anyhow!(
            "fibonacci({}) overflows u64; the largest supported index is {}",
            options.n,
            MAX_FIB_INDEX
        )
        .into());
    }
    if options.repeat == 0 {
        return Err(anyhow!("repeat must be at least 1").into());
    }

    let fib = fib_class(weaver);
    let hits = Arc::new(AtomicUsize::new(0));

    if options.cache {
        let memo: Arc<Mutex<HashMap<u64, Value>>> = Arc::new(Mutex::new(HashMap::new()));
        let hits = Arc::clone(&hits);
        weaver.around(Pointcut::call(&fib, "fibonacci"), move |ctx| {
            let n = as_index(ctx.arg("n")?)?;
            if let Some(cached) = memo.lock().get(&n).cloned() {
                hits.fetch_add(1, Ordering::Relaxed);
                return Ok(cached);
            }
            let value = ctx.proceed_unchanged()?;
            memo.lock().insert(n, value.clone());
            Ok(value)
        })?;
    }

    if options.trace_calls {
        let depth = Arc::new(AtomicUsize::new(0));
        weaver.around(Pointcut::call(&fib, "fibonacci"), move |ctx| {
            let n = as_index(ctx.arg("n")?)?;
            let level = depth.fetch_add(1, Ordering::Relaxed);
            info!(n, depth = level, "fibonacci entered");
            let result = ctx.proceed_unchanged();
            depth.fetch_sub(1, Ordering::Relaxed);
            info!(n, depth = level, ok = result.is_ok(), "fibonacci returned");
            result
        })?;
    }

    let receiver = Object::with_state(
        &fib,
        FibState {
            executions: AtomicUsize::new(0),
        },
    );

    let mut value = Value::Null;
    for _ in 0..options.repeat {
        value = receiver.call("fibonacci", Arguments::new().with(options.n))?;
    }

    let executions = receiver
        .state::<FibState>()
        .map(|state| state.executions.load(Ordering::Relaxed))
        .unwrap_or_default();

    Ok(FibReport {
        n: options.n,
        value: as_index(&value)?,
        executions,
        cache_hits: hits.load(Ordering::Relaxed),
    })
}

fn fib_class(weaver: &Weaver) -> Arc<Class> {
    weaver
        .class("Fib")
        .method("fibonacci", &["n"], |inv| {
            let n = as_index(inv.arg("n")?)?;
            if let Some(state) = inv.receiver().state::<FibState>() {
                state.executions.fetch_add(1, Ordering::Relaxed);
            }
            if n < 2 {
                return Ok(Value::from(n));
            }
            let a = as_index(&inv.call_self("fibonacci", Arguments::new().with(n - 1))?)?;
            let b = as_index(&inv.call_self("fibonacci", Arguments::new().with(n - 2))?)?;
            let sum = a
                .checked_add(b)
                .ok_or_else(|| anyhow!("fibonacci({}) overflows u64", n))?;
            Ok(Value::from(sum))
        })
        .build()
}

fn as_index(value: &Value) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| anyhow!("expected a non-negative integer, got {}", value).into())
}

/// Per-process state for routing commands
pub struct RunContext {
    weaver: Weaver,
}

impl RunContext {
    pub fn new(config: &WeaverConfig) -> Self {
        Self {
            weaver: Weaver::from_config(config),
        }
    }

    pub fn weaver(&self) -> &Weaver {
        &self.weaver
    }

    /// Execute a command and return its rendered output
    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Fib {
                n,
                cache,
                trace_calls,
                repeat,
            } => {
                let report = fibonacci(
                    &self.weaver,
                    FibOptions {
                        n: *n,
                        cache: *cache,
                        trace_calls: *trace_calls,
                        repeat: *repeat,
                    },
                )?;
                Ok(report.to_string())
            }
        }
    }
}
