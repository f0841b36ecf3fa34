//! Registration order, around chains and argument replacement

use crate::integration::test_utils::Recorder;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use weaver::{AspectError, Arguments, Object, Phase, Pointcut, Value, Weaver};

#[test]
fn test_before_advice_fires_in_registration_order() {
    let weaver = Weaver::new();
    let foo = weaver
        .class("Foo")
        .method("baz", &[], |_| Ok(Value::Null))
        .build();
    let recorder = Recorder::new();

    let pc = Pointcut::call(&foo, "baz");
    weaver.before(pc.copy(), recorder.marker("1")).unwrap();
    weaver.before(pc.copy(), recorder.marker("2")).unwrap();

    Object::new(&foo).call("baz", ()).unwrap();
    assert_eq!(recorder.events(), vec!["1", "2"]);
}

#[test]
fn test_same_pointcut_cannot_carry_two_advices() {
    let weaver = Weaver::new();
    let foo = weaver
        .class("Foo")
        .method("baz", &[], |_| Ok(Value::Null))
        .build();
    let recorder = Recorder::new();

    let pc = Pointcut::call(&foo, "baz");
    weaver.before(pc.clone(), recorder.marker("1")).unwrap();
    let err = weaver.after(pc, recorder.marker("2")).unwrap_err();
    assert!(matches!(err, AspectError::BindingConflict(_)));
    assert_eq!(weaver.registry().len(), 1);

    Object::new(&foo).call("baz", ()).unwrap();
    assert_eq!(recorder.events(), vec!["1"]);
}

#[test]
fn test_around_chain_runs_outermost_first_and_gates_on_proceed() {
    let weaver = Weaver::new();
    let body_runs = Arc::new(AtomicUsize::new(0));
    let runs = Arc::clone(&body_runs);
    let foo = weaver
        .class("Foo")
        .method("bar", &["x"], move |inv| {
            runs.fetch_add(1, Ordering::SeqCst);
            inv.arg("x").cloned()
        })
        .build();

    let log = Arc::new(Mutex::new(Vec::new()));
    let pc = Pointcut::call(&foo, "bar");
    let l = Arc::clone(&log);
    weaver
        .around(pc.copy(), move |ctx| {
            l.lock().push("B1");
            let x = ctx.arg("x")?.as_i64().unwrap_or_default();
            ctx.proceed(Arguments::new().with(x * 10))
        })
        .unwrap();
    let l = Arc::clone(&log);
    weaver
        .around(pc.copy(), move |ctx| {
            l.lock().push("B2");
            let x = ctx.arg("x")?.as_i64().unwrap_or_default();
            ctx.proceed(Arguments::new().with(x + 1))
        })
        .unwrap();

    let result = Object::new(&foo).call("bar", vec![json!(4)]).unwrap();
    assert_eq!(result, json!(41));
    assert_eq!(*log.lock(), vec!["B1", "B2"]);
    assert_eq!(body_runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_outer_advice_that_returns_early_skips_inner_chain() {
    let weaver = Weaver::new();
    let body_runs = Arc::new(AtomicUsize::new(0));
    let runs = Arc::clone(&body_runs);
    let foo = weaver
        .class("Foo")
        .method("bar", &[], move |_| {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(json!("body"))
        })
        .build();

    let recorder = Recorder::new();
    let pc = Pointcut::call(&foo, "bar");
    let outer = recorder.marker("outer");
    weaver
        .around(pc.copy(), move |ctx| {
            outer(ctx)?;
            Ok(json!("short-circuit"))
        })
        .unwrap();
    weaver.around(pc.copy(), recorder.proceeding()).unwrap();

    let result = Object::new(&foo).call("bar", ()).unwrap();
    assert_eq!(result, json!("short-circuit"));
    assert_eq!(recorder.events(), vec!["outer"]);
    assert_eq!(body_runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_memoized_factorial_runs_body_once_per_argument() {
    let weaver = Weaver::new();
    let executions = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&executions);
    let math = weaver
        .class("Math")
        .method("factorial", &["n"], move |inv| {
            count.fetch_add(1, Ordering::SeqCst);
            let n = inv.arg("n")?.as_u64().unwrap_or_default();
            if n <= 1 {
                return Ok(json!(1));
            }
            let rest = inv.call_self("factorial", vec![json!(n - 1)])?;
            Ok(json!(n * rest.as_u64().unwrap_or_default()))
        })
        .build();

    let cache: Arc<Mutex<HashMap<u64, Value>>> = Arc::new(Mutex::new(HashMap::new()));
    weaver
        .around(Pointcut::call(&math, "factorial"), move |ctx| {
            let n = ctx.arg("n")?.as_u64().unwrap_or_default();
            if let Some(hit) = cache.lock().get(&n).cloned() {
                return Ok(hit);
            }
            let value = ctx.proceed_unchanged()?;
            cache.lock().insert(n, value.clone());
            Ok(value)
        })
        .unwrap();

    let m = Object::new(&math);
    assert_eq!(m.call("factorial", vec![json!(10)]).unwrap(), json!(3_628_800));
    assert_eq!(executions.load(Ordering::SeqCst), 10);

    assert_eq!(m.call("factorial", vec![json!(10)]).unwrap(), json!(3_628_800));
    assert_eq!(m.call("factorial", vec![json!(7)]).unwrap(), json!(5040));
    assert_eq!(executions.load(Ordering::SeqCst), 10);

    assert_eq!(m.call("factorial", vec![json!(12)]).unwrap(), json!(479_001_600));
    assert_eq!(executions.load(Ordering::SeqCst), 12);
}

#[test]
fn test_advice_that_never_proceeds_replaces_the_body() {
    let weaver = Weaver::new();
    let executions = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&executions);
    let foo = weaver
        .class("Foo")
        .method("bar", &[], move |_| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(json!("body"))
        })
        .build();

    weaver
        .around(Pointcut::call(&foo, "bar"), |_| Ok(json!("advice")))
        .unwrap();

    assert_eq!(Object::new(&foo).call("bar", ()).unwrap(), json!("advice"));
    assert_eq!(executions.load(Ordering::SeqCst), 0);
}

#[test]
fn test_proceed_outside_around_is_invalid() {
    let weaver = Weaver::new();
    let foo = weaver
        .class("Foo")
        .method("bar", &[], |_| Ok(json!("body")))
        .build();
    weaver
        .before(Pointcut::call(&foo, "bar"), |ctx| ctx.proceed_unchanged())
        .unwrap();

    let err = Object::new(&foo).call("bar", ()).unwrap_err();
    assert!(matches!(err, AspectError::InvalidContinuation(Phase::Before)));
}

#[test]
fn test_proceed_from_after_advice_is_invalid_and_flow_still_unwinds() {
    let weaver = Weaver::new();
    let foo = weaver
        .class("Foo")
        .method("bar", &[], |_| Ok(json!("body")))
        .method("baz", &[], |_| Ok(json!("baz")))
        .build();
    let recorder = Recorder::new();

    weaver
        .after(Pointcut::call(&foo, "bar"), |ctx| ctx.proceed_unchanged())
        .unwrap();
    weaver
        .before(
            Pointcut::call(&foo, "baz").and(Pointcut::cflow(Pointcut::call(&foo, "bar"))),
            recorder.marker("baz inside bar"),
        )
        .unwrap();

    let f = Object::new(&foo);
    let err = f.call("bar", ()).unwrap_err();
    assert!(matches!(err, AspectError::InvalidContinuation(Phase::After)));

    // bar's flow was closed even though its after phase failed
    f.call("baz", ()).unwrap();
    assert!(recorder.events().is_empty());
}

#[test]
fn test_second_proceed_reenters_inner_advice() {
    let weaver = Weaver::new();
    let body_runs = Arc::new(AtomicUsize::new(0));
    let runs = Arc::clone(&body_runs);
    let foo = weaver
        .class("Foo")
        .method("bar", &["x"], move |inv| {
            runs.fetch_add(1, Ordering::SeqCst);
            inv.arg("x").cloned()
        })
        .build();

    let pc = Pointcut::call(&foo, "bar");
    weaver
        .around(pc.copy(), |ctx| {
            let first = ctx.proceed(Arguments::new().with(1))?;
            let second = ctx.proceed(Arguments::new().with(2))?;
            Ok(json!([first, second]))
        })
        .unwrap();
    let inner_runs = Arc::new(AtomicUsize::new(0));
    let runs = Arc::clone(&inner_runs);
    weaver
        .around(pc.copy(), move |ctx| {
            runs.fetch_add(1, Ordering::SeqCst);
            let x = ctx.arg("x")?.as_i64().unwrap_or_default();
            ctx.proceed(Arguments::new().with(x * 10))
        })
        .unwrap();

    let result = Object::new(&foo).call("bar", vec![json!(0)]).unwrap();
    assert_eq!(result, json!([10, 20]));
    assert_eq!(inner_runs.load(Ordering::SeqCst), 2);
    assert_eq!(body_runs.load(Ordering::SeqCst), 2);
}

#[test]
fn test_raised_errors_propagate_and_skip_after_advice() {
    let weaver = Weaver::new();
    let foo = weaver
        .class("Foo")
        .method("bar", &[], |_| Err(anyhow::anyhow!("boom").into()))
        .build();
    let recorder = Recorder::new();
    weaver
        .after(Pointcut::call(&foo, "bar"), recorder.marker("after"))
        .unwrap();

    let err = Object::new(&foo).call("bar", ()).unwrap_err();
    assert!(matches!(err, AspectError::Raised(_)));
    assert_eq!(err.to_string(), "boom");
    assert!(recorder.events().is_empty());
}

#[test]
fn test_advice_registered_after_class_creation_applies() {
    let weaver = Weaver::new();
    let foo = weaver
        .class("Foo")
        .method("bar", &[], |_| Ok(json!(1)))
        .build();
    let f = Object::new(&foo);
    assert_eq!(f.call("bar", ()).unwrap(), json!(1));

    weaver
        .around(Pointcut::call(&foo, "bar"), |ctx| {
            let inner = ctx.proceed_unchanged()?;
            Ok(json!(inner.as_i64().unwrap_or_default() + 1))
        })
        .unwrap();
    assert_eq!(f.call("bar", ()).unwrap(), json!(2));
}
