/*
 * functions_test.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sass_bridge::{Options, RenderError, render_sync};
use sass_bridge_runtime::MemoryRuntime;
use sass_bridge_values::{
    Color, FALSE, HostError, HostValue, List, Map, NULL, Number, SassBoolean, SassNull, SassString,
    TRUE, Value, ValueError,
};

fn css(options: Options) -> String {
    let output = render_sync(options.with_runtime(MemoryRuntime::new())).unwrap();
    output.css.trim().to_string()
}

fn failure(options: Options) -> RenderError {
    render_sync(options.with_runtime(MemoryRuntime::new())).unwrap_err()
}

fn number(value: &Value) -> &Number {
    value.as_number().unwrap()
}

#[test]
fn test_nullary_function() {
    let options = Options::default()
        .data("div { color: foo(); }")
        .function("foo()", |_, _| Ok(Number::new(42.0, "px").into()));
    assert_eq!(css(options), "div {\n  color: 42px; }");
}

#[test]
fn test_function_with_multiple_args() {
    let options = Options::default()
        .data("div { color: foo(3, 42px); }")
        .function("foo($a, $b)", |_, args| {
            let factor = number(&args[0]).value();
            let size = number(&args[1]);
            Ok(Number::new(factor * size.value(), size.unit()).into())
        });
    assert_eq!(css(options), "div {\n  color: 126px; }");
}

#[test]
fn test_function_completing_from_another_thread() {
    let options = Options::default()
        .data("div { color: foo(42px); }")
        .async_function("foo($a)", |_, _, done| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                done.complete(Ok(Number::new(66.0, "em").into()));
            });
        });
    assert_eq!(css(options), "div {\n  color: 66em; }");
}

#[test]
fn test_number_setters() {
    let options = Options::default()
        .data("div { width: foo(42px); height: bar(42px); }")
        .function("foo($a)", |_, mut args| {
            let mut size = args.remove(0);
            size.as_number_mut().unwrap().set_unit("rem")?;
            Ok(size.into())
        })
        .function("bar($a)", |_, mut args| {
            let mut size = args.remove(0);
            let n = size.as_number_mut().unwrap();
            let doubled = n.value() * 2.0;
            n.set_value(doubled)?;
            Ok(size.into())
        });
    assert_eq!(css(options), "div {\n  width: 42rem;\n  height: 84px; }");
}

#[test]
fn test_quoted_strings_keep_their_quotes() {
    let options = Options::default()
        .data("div { color: foo(\"bar\"); width: baz(\"bar\"); }")
        .function("foo($a)", |_, args| {
            let text = args[0].as_string().unwrap().unquoted().to_string();
            Ok(SassString::new(format!("\"{}{}\"", text, text)).into())
        })
        .function("baz($a)", |_, mut args| {
            let mut value = args.remove(0);
            let string = value.as_string_mut().unwrap();
            assert_eq!(string.value(), "\"bar\"");
            string.set_value("\"barbar\"")?;
            Ok(value.into())
        });
    assert_eq!(css(options), "div {\n  color: \"barbar\";\n  width: \"barbar\"; }");
}

#[test]
fn test_colors() {
    let options = Options::default()
        .data("div { color: foo(#f00); background-color: bar(); border-color: baz(); }")
        .function("foo($a)", |_, args| {
            let color = args[0].as_color().unwrap();
            assert_eq!((color.r(), color.g(), color.b(), color.a()), (255.0, 0.0, 0.0, 1.0));
            Ok(Color::new(255.0, 255.0, 0.0, 0.5).into())
        })
        .function("bar()", |_, _| Ok(Color::from_argb(0x33ff00ff).into()))
        .function("baz()", |_, _| Ok(Color::from_argb(0xffff0000).into()));
    assert_eq!(
        css(options),
        "div {\n  color: rgba(255, 255, 0, 0.5);\n  background-color: rgba(255, 0, 255, 0.2);\n  border-color: red; }"
    );
}

#[test]
fn test_booleans() {
    let options = Options::default()
        .data(
            "div { color: if(foo(true, false), #fff, #000);\n  background-color: if(foo(true, true), #fff, #000); }",
        )
        .function("foo($a, $b)", |_, args| {
            let both = args[0].as_bool().unwrap() && args[1].as_bool().unwrap();
            Ok(SassBoolean::from_bool(both).into())
        });
    assert_eq!(css(options), "div {\n  color: #000;\n  background-color: #fff; }");
}

#[test]
fn test_boolean_singletons_returned_directly() {
    let options = Options::default()
        .data("div { color: if(foo(false), #fff, #000); background-color: if(foo(true), #fff, #000); }")
        .function("foo($a)", |_, args| {
            let flipped = if args[0].as_bool().unwrap() { &FALSE } else { &TRUE };
            Ok(flipped.into())
        });
    assert_eq!(css(options), "div {\n  color: #fff;\n  background-color: #000; }");
}

#[test]
fn test_lists() {
    let options = Options::default()
        .data("$test-list: (bar, #f00, 123em); @each $item in foo($test-list) { .#{$item} { color: #fff; } }")
        .function("foo($l)", |_, args| {
            let list = args[0].as_list().unwrap();
            assert_eq!(list.len(), 3);
            assert_eq!(list.get_value(0)?.as_string().unwrap().value(), "bar");
            assert_eq!(list.get_value(1)?.as_color().unwrap().r(), 255.0);
            let third = list.get_value(2)?.as_number().unwrap();
            assert_eq!((third.value(), third.unit()), (123.0, "em"));

            let mut out = List::new(3);
            out.set_value(0, SassString::new("foo"))?;
            out.set_value(1, SassString::new("bar"))?;
            out.set_value(2, SassString::new("baz"))?;
            Ok(out.into())
        });
    assert_eq!(
        css(options),
        ".foo {\n  color: #fff; }\n\n.bar {\n  color: #fff; }\n\n.baz {\n  color: #fff; }"
    );
}

#[test]
fn test_maps() {
    let options = Options::default()
        .data(
            "$test-map: foo((abc: 123, #def: true)); div { color: if(map-has-key($test-map, hello), #fff, #000); }span { color: map-get($test-map, baz); }",
        )
        .function("foo($m)", |_, args| {
            let map = args[0].as_map().unwrap();
            assert_eq!(map.len(), 2);
            assert_eq!(map.get_key(0)?.as_string().unwrap().value(), "abc");
            assert_eq!(map.get_value(0)?.as_number().unwrap().value(), 123.0);
            assert_eq!(map.get_key(1)?.as_color().unwrap().r(), 221.0);
            assert_eq!(map.get_value(1)?.as_bool(), Some(true));

            let mut out = Map::new(3);
            let pairs = [("hello", "world"), ("foo", "bar"), ("baz", "qux")];
            for (i, (k, v)) in pairs.into_iter().enumerate() {
                out.set_key(i, SassString::new(k))?;
                out.set_value(i, SassString::new(v))?;
            }
            Ok(out.into())
        });
    assert_eq!(css(options), "div {\n  color: #fff; }\n\nspan {\n  color: qux; }");
}

#[test]
fn test_null() {
    let options = Options::default()
        .data(
            "div { color: if(foo(\"bar\"), #fff, #000); } span { color: if(foo(null), #fff, #000); }table { color: if(bar() == null, #fff, #000); }",
        )
        .function("foo($a)", |_, args| Ok(SassBoolean::from_bool(args[0].is_null()).into()))
        .function("bar()", |_, _| Ok((&NULL).into()));
    assert_eq!(
        css(options),
        "div {\n  color: #000; }\n\nspan {\n  color: #fff; }\n\ntable {\n  color: #fff; }"
    );
}

#[test]
fn test_values_carried_across_renders() {
    let stored: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));

    let keep = Arc::clone(&stored);
    let first = Options::default()
        .data("div { color: foo((abc: #112233, #ddeeff: true)); }")
        .function("foo", move |_, mut args| {
            *keep.lock().unwrap() = Some(args.remove(0));
            Ok(Color::rgb(0.0, 0.0, 0.0).into())
        });
    css(first);

    let whole = Arc::clone(&stored);
    let key = Arc::clone(&stored);
    let second = Options::default()
        .data("div { color: map-get(bar(), abc); background-color: baz(); }")
        .function("bar", move |_, _| Ok(whole.lock().unwrap().clone().into()))
        .function("baz", move |_, _| {
            let guard = key.lock().unwrap();
            let map = guard.as_ref().and_then(Value::as_map).unwrap();
            Ok(map.get_key(1)?.clone().into())
        });
    assert_eq!(css(second), "div {\n  color: #112233;\n  background-color: #ddeeff; }");
}

#[test]
fn test_function_without_signature() {
    let options = Options::default()
        .data("div { color: foo(20, 22); }")
        .function("foo", |_, args| {
            Ok(Number::new(number(&args[0]).value() + number(&args[1]).value(), "em").into())
        });
    assert_eq!(css(options), "div {\n  color: 42em; }");
}

#[test]
fn test_default_arguments_and_list_interpolation() {
    let options = Options::default()
        .data("#{headings(2,5)} { color: #08c; }")
        .function("headings($from: 0, $to: 6)", |_, args| {
            let from = number(&args[0]).value() as usize;
            let to = number(&args[1]).value() as usize;
            let mut list = List::new(to - from + 1);
            for i in from..=to {
                list.set_value(i - from, SassString::new(format!("h{}", i)))?;
            }
            Ok(list.into())
        });
    assert_eq!(css(options), "h2, h3, h4, h5 {\n  color: #08c; }");
}

#[test]
fn test_underscore_and_hyphen_names_match() {
    let options = Options::default()
        .data("div { a: my-fn(); b: my_fn(); }")
        .function("my_fn()", |_, _| Ok(Number::unitless(1.0).into()));
    assert_eq!(css(options), "div {\n  a: 1;\n  b: 1; }");
}

#[test]
fn test_non_value_return_fails() {
    let err = failure(
        Options::default()
            .data("div { color: foo(); }")
            .function("foo()", |_, _| Ok(HostValue::from("not a value"))),
    );
    assert_eq!(err.status(), 1);
    assert!(err.to_string().contains("A SassValue object was expected"), "{}", err);
}

#[test]
fn test_error_returned_as_value() {
    let err = failure(
        Options::default()
            .data("div { color: foo(); }")
            .function("foo()", |_, _| Ok(HostValue::error("doh!"))),
    );
    assert!(err.to_string().contains("doh!"), "{}", err);
}

#[test]
fn test_thrown_errors() {
    let err = failure(
        Options::default()
            .data("div { color: foo(); }")
            .function("foo()", |_, _| Err(HostError::message("This is a test error"))),
    );
    assert!(err.to_string().contains("This is a test error"), "{}", err);

    let err = failure(
        Options::default()
            .data("div { color: foo(); }")
            .function("foo()", |_, _| Err(HostError::Unknown)),
    );
    assert!(err.to_string().contains("unexpected error"), "{}", err);
}

#[test]
fn test_async_error_completion() {
    let err = failure(
        Options::default()
            .data("div { color: foo(); }")
            .async_function("foo()", |_, _, done| {
                thread::spawn(move || done.complete(Err(HostError::message("late failure"))));
            }),
    );
    assert!(err.to_string().contains("late failure"), "{}", err);
}

#[test]
fn test_dropped_completion_handle_fails_the_job() {
    let err = failure(
        Options::default()
            .data("div { color: foo(); }")
            .async_function("foo()", |_, _, done| drop(done)),
    );
    assert!(matches!(err, RenderError::Worker(_)), "{:?}", err);
}

#[test]
fn test_only_first_completion_counts() {
    let options = Options::default()
        .data("div { color: foo(); }")
        .async_function("foo()", |_, _, done| {
            done.complete(Ok(Number::new(1.0, "px").into()));
            done.complete(Ok(Number::new(2.0, "px").into()));
        });
    assert_eq!(css(options), "div {\n  color: 1px; }");
}

#[test]
fn test_functions_share_the_job_context() {
    let options = Options::default()
        .data("div { a: foo(); b: foo(); }")
        .function("foo()", |ctx, _| {
            assert_eq!(ctx.options().data.as_deref(), Some("div { a: foo(); b: foo(); }"));
            Ok(Number::unitless(ctx.bump("calls")).into())
        });
    assert_eq!(css(options), "div {\n  a: 1;\n  b: 2; }");
}

#[test]
fn test_singletons_are_identical_everywhere() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let options = Options::default()
        .data("div { a: foo(null, true, false); }")
        .function("foo($n, $t, $f)", move |_, args| {
            sink.lock().unwrap().extend(args);
            Ok((&NULL).into())
        });
    css(options);
    let seen = seen.lock().unwrap();
    assert!(seen[0].is_same(&Value::Null(SassNull::instance())));
    assert!(seen[1].is_same(&Value::Boolean(&TRUE)));
    assert!(seen[2].is_same(&Value::Boolean(&FALSE)));
    assert!(seen[1].is_same(&Value::boolean(true)));
}

#[test]
fn test_container_setters_reject_bare_data() {
    let bare = ValueError::Type("Supplied value should be a SassValue object".into());
    let object = || HostValue::object([("value", HostValue::from(1.0))]);

    let mut list = List::new(1);
    assert_eq!(list.set_value(0, 1.0).unwrap_err(), bare);
    assert_eq!(
        list.set_value(0, object()).unwrap_err(),
        ValueError::Type("A SassValue is expected as the list item".into())
    );

    let mut map = Map::new(1);
    assert_eq!(map.set_key(0, "key").unwrap_err(), bare);
    assert_eq!(
        map.set_key(0, object()).unwrap_err(),
        ValueError::Type("A SassValue is expected as a map key".into())
    );
    assert_eq!(
        map.set_value(0, object()).unwrap_err(),
        ValueError::Type("A SassValue is expected as a map value".into())
    );
}

#[test]
fn test_unset_lists_hold_null() {
    let options = Options::default()
        .data("div { a: length(foo()); b: type-of(nth(foo(), 1)); }")
        .function("foo()", |_, _| Ok(List::new(2).into()));
    assert_eq!(css(options), "div {\n  a: 2;\n  b: null; }");
}

#[test]
fn test_importer_state_visible_to_functions() {
    let options = Options::default()
        .data("@import \"seed\";\na { b: seen(); }")
        .importer(|ctx, _, _| {
            ctx.set("from_importer", 7.0);
            Ok(HostValue::object([("contents", HostValue::from("$unused: 1;"))]))
        })
        .function("seen()", |ctx, _| {
            let n = ctx.get("from_importer").and_then(HostValue::as_f64);
            Ok(Number::unitless(n.unwrap_or(0.0)).into())
        });
    assert_eq!(css(options), "a {\n  b: 7; }");
}

#[test]
fn test_value_errors_inside_functions_fail_the_call() {
    let render = |args: Vec<HostValue>| {
        let options = Options::default()
            .data("a { b: foo(); }")
            .function("foo()", move |_, _| Ok(Color::from_args(&args)?.into()));
        failure(options).to_string()
    };
    assert_eq!(
        render(vec![1.0.into(), 2.0.into()]),
        "error in function `foo`: Constructor should be invoked with either 0, 1, 3 or 4 arguments"
    );
    assert_eq!(
        render(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
        "error in function `foo`: Constructor arguments should be numbers exclusively"
    );
    assert_eq!(
        render(vec!["#fff".into()]),
        "error in function `foo`: Only argument should be an integer"
    );
}

#[test]
fn test_setter_errors_inside_functions_fail_the_call() {
    let options = Options::default()
        .data("a { b: foo(1px); }")
        .function("foo($a)", |_, mut args| {
            let mut size = args.remove(0);
            size.as_number_mut().unwrap().set_unit(1.0)?;
            Ok(size.into())
        });
    let err = failure(options);
    assert!(matches!(err, RenderError::Function { .. }), "{:?}", err);
    assert_eq!(err.to_string(), "error in function `foo`: Supplied value should be a string");
}
