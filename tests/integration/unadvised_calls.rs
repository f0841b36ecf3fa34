//! Calls through dispatchers with no matching advice, and context accessors

use serde_json::json;
use weaver::{AspectError, Arguments, Class, Context, MethodRef, Object, Phase, Weaver};

fn foo_class(weaver: &Weaver) -> std::sync::Arc<Class> {
    weaver
        .class("Foo")
        .method("a", &["i"], |inv| {
            Ok(json!(inv.arg("i")?.as_i64().unwrap_or_default() + 1))
        })
        .method("b", &[], |inv| Ok(json!(inv.args().positional)))
        .method("c", &["i"], |inv| {
            let key = inv.arg("i")?.as_str().unwrap_or_default().to_string();
            Ok(inv.args().named(&key).cloned().unwrap_or_default())
        })
        .build()
}

#[test]
fn test_unadvised_calls_return_body_results() {
    let weaver = Weaver::new();
    let f = Object::new(&foo_class(&weaver));

    assert_eq!(f.call("a", Arguments::new().with(4)).unwrap(), json!(5));
    assert_eq!(
        f.call("b", Arguments::new().with("a").with("b")).unwrap(),
        json!(["a", "b"])
    );
    assert_eq!(
        f.call(
            "c",
            Arguments::new()
                .with("c")
                .with_named("c", 4)
                .with_named("d", 5)
        )
        .unwrap(),
        json!(4)
    );
}

#[test]
fn test_every_declared_method_is_wrapped() {
    let weaver = Weaver::new();
    let foo = foo_class(&weaver);
    for name in ["a", "b", "c"] {
        assert!(foo.declared(name).unwrap().is_wrapped(), "{name} not wrapped");
    }
    assert!(foo.is_advisable());
}

#[test]
fn test_plain_class_is_not_wrapped() {
    let plain = Class::plain("Plain")
        .method("bar", &["i"], |inv| inv.arg("i").cloned())
        .build();
    assert!(!plain.is_advisable());
    assert!(!plain.declared("bar").unwrap().is_wrapped());
    assert_eq!(
        Object::new(&plain).call("bar", vec![json!(1)]).unwrap(),
        json!(1)
    );
}

#[test]
fn test_context_accessors() {
    let foo = Class::plain("Foo")
        .method("bar", &["i"], |_| Ok(json!(null)))
        .build();
    let f = Object::new(&foo);
    let method = foo.declared("bar").unwrap().clone();
    let args = Arguments::new().with(1);
    let ctx = Context::new(Phase::Around, f.clone(), method, args.clone());

    assert_eq!(ctx.phase(), Phase::Around);
    assert_eq!(ctx.method_name(), "bar");
    assert!(ctx.receiver().ptr_eq(&f));
    assert!(std::sync::Arc::ptr_eq(ctx.receiver_class(), &foo));
    assert_eq!(ctx.args(), &args);
    assert!(!ctx.has_continuation());
}

#[test]
fn test_get_arg_by_parameter_name() {
    let weaver = Weaver::new();
    let foo = weaver
        .class("Foo")
        .method("bar", &["i", "j"], |_| Ok(json!(null)))
        .build();
    let handle: MethodRef = foo.declared("bar").unwrap().clone();
    let ctx = Context::new(
        Phase::Around,
        Object::new(&foo),
        handle,
        Arguments::new().with(11).with(72),
    );

    assert_eq!(ctx.arg("i").unwrap(), &json!(11));
    assert_eq!(ctx.arg("j").unwrap(), &json!(72));
    assert_eq!(
        ctx.original_method().parameter_names(),
        &["i".to_string(), "j".to_string()]
    );
    assert!(matches!(
        ctx.arg("k"),
        Err(AspectError::ArgumentNotFound { .. })
    ));
}

#[test]
fn test_missing_method_is_reported() {
    let weaver = Weaver::new();
    let f = Object::new(&foo_class(&weaver));
    let err = f.call("nope", ()).unwrap_err();
    assert!(matches!(err, AspectError::MethodNotFound { .. }));
    assert_eq!(
        err.to_string(),
        "Method not found: class 'Foo' has no method 'nope'"
    );
}
