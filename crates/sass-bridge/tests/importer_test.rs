/*
 * importer_test.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use pretty_assertions::assert_eq;
use sass_bridge::{Options, RenderError, render, render_sync};
use sass_bridge_values::{HostError, HostValue, NULL};

const YELLOW: &str = "div {\n  color: yellow; }\n\ndiv {\n  color: yellow; }";

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(relative)
}

fn fixture_str(relative: &str) -> String {
    fixture(relative).to_string_lossy().into_owned()
}

fn index_source() -> String {
    fs::read_to_string(fixture("include-files/index.scss")).unwrap()
}

fn css(options: Options) -> String {
    render_sync(options).unwrap().css.trim().to_string()
}

fn yellow() -> HostValue {
    HostValue::object([("contents", HostValue::from("div {color: yellow;}"))])
}

#[test]
fn test_native_imports_without_importers() {
    let output = css(Options::default().file(fixture_str("include-files/index.scss")));
    assert_eq!(output, ".foo {\n  color: #333; }\n\n.bar {\n  color: blue; }");
}

#[test]
fn test_chained_custom_and_native_imports() {
    let options = Options::default()
        .file(fixture_str("include-files/chained-imports-with-custom-importer.scss"))
        .async_importer(|_, url, _, done| {
            if url != "file-processed-by-loader" {
                done.complete(Ok((&NULL).into()));
                return;
            }
            let file = fixture_str(&format!("include-files/{}.scss", url));
            done.complete(Ok(HostValue::object([("file", HostValue::from(file))])));
        });
    assert_eq!(css(options), "body {\n  color: \"red\"; }");
}

#[test]
fn test_prev_is_the_file_an_importer_named() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);
    let options = Options::default()
        .data("@import \"a\";")
        .importer(move |_, url, prev| {
            record.lock().unwrap().push((url.to_string(), prev.to_string()));
            Ok(if url == "a" {
                HostValue::object([
                    ("file", HostValue::from("/Users/me/sass/lib/a.scss")),
                    ("contents", HostValue::from("@import \"b\";")),
                ])
            } else {
                HostValue::object([
                    ("file", HostValue::from("/Users/me/sass/lib/b.scss")),
                    ("contents", HostValue::from("div {color: yellow;}")),
                ])
            })
        });
    assert_eq!(css(options), "div {\n  color: yellow; }");
    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            ("a".to_string(), "stdin".to_string()),
            ("b".to_string(), "/Users/me/sass/lib/a.scss".to_string()),
        ]
    );
}

#[test]
fn test_file_and_contents_override_data_input() {
    let options = Options::default().data(index_source()).async_importer(|_, _, _, done| {
        done.complete(Ok(HostValue::object([
            ("file", HostValue::from("/some/other/path.scss")),
            ("contents", HostValue::from("div {color: yellow;}")),
        ])));
    });
    assert_eq!(css(options), YELLOW);
}

#[test]
fn test_file_and_contents_override_file_input() {
    let options = Options::default()
        .file(fixture_str("include-files/index.scss"))
        .importer(|_, url, prev| {
            Ok(HostValue::object([
                ("file", HostValue::from(format!("{}{}", prev, url))),
                ("contents", HostValue::from("div {color: yellow;}")),
            ]))
        });
    assert_eq!(css(options), YELLOW);
}

#[test]
fn test_file_only_return_is_read_from_disk() {
    let dir = fixture("include-files");
    let options = Options::default().data(index_source()).importer(move |_, url, _| {
        let file = dir.join(format!("{}.scss", url));
        Ok(HostValue::object([(
            "file",
            HostValue::from(file.to_string_lossy().into_owned()),
        )]))
    });
    assert_eq!(css(options), ".foo {\n  color: #333; }\n\n.bar {\n  color: blue; }");
}

#[test]
fn test_file_only_return_relative_to_prev() {
    let options = Options::default()
        .file(fixture_str("include-files/index.scss"))
        .importer(|_, url, prev| {
            let dir = Path::new(prev).parent().unwrap();
            let file = dir.join(url).with_extension("scss");
            Ok(HostValue::object([(
                "file",
                HostValue::from(file.to_string_lossy().into_owned()),
            )]))
        });
    assert_eq!(css(options), ".foo {\n  color: #333; }\n\n.bar {\n  color: blue; }");
}

#[test]
fn test_nullish_returns_fall_back_to_native() {
    let returns = [
        HostValue::from(&NULL),
        HostValue::Null,
        HostValue::Undefined,
        HostValue::Bool(false),
        HostValue::object(Vec::<(String, HostValue)>::new()),
    ];
    for returned in returns {
        let options = Options::default()
            .file(fixture_str("include-files/index.scss"))
            .importer(move |_, _, _| Ok(returned.clone()));
        assert_eq!(css(options), ".foo {\n  color: #333; }\n\n.bar {\n  color: blue; }");
    }
}

#[test]
fn test_contents_only_override() {
    let data = css(Options::default().data(index_source()).importer(|_, _, _| Ok(yellow())));
    assert_eq!(data, YELLOW);
    let file = css(
        Options::default()
            .file(fixture_str("include-files/index.scss"))
            .async_importer(|_, _, _, done| done.complete(Ok(yellow()))),
    );
    assert_eq!(file, YELLOW);
}

#[test]
fn test_importers_run_in_order() {
    let options = Options::default()
        .file(fixture_str("include-files/index.scss"))
        .importer(|_, _, _| Ok((&NULL).into()))
        .importer(|_, _, _| Ok(yellow()));
    assert_eq!(css(options), YELLOW);
}

#[test]
fn test_imports_resolve_depth_first() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&order);
    let options = Options::default()
        .file(fixture_str("depth-first/index.scss"))
        .async_importer(move |_, url, _, done| {
            record.lock().unwrap().push(url.to_string());
            done.complete(Ok(HostValue::Undefined));
        });
    let expected = fs::read_to_string(fixture("depth-first/expected.css")).unwrap();
    assert_eq!(css(options), expected.trim());
    assert_eq!(
        *order.lock().unwrap(),
        vec!["a", "_common", "vars", "struct", "a1", "common", "vars", "struct", "b", "b1"]
    );
}

#[test]
fn test_importer_sees_options() {
    let file = fixture_str("include-files/index.scss");
    let expected = file.clone();
    let (tx, rx) = mpsc::channel();
    let options = Options::default().file(file.clone()).importer(move |ctx, _, _| {
        assert_eq!(ctx.options().file.as_deref(), Some(expected.as_str()));
        Ok(HostValue::object(Vec::<(String, HostValue)>::new()))
    });
    render(options, move |result, ctx| {
        tx.send((result.is_ok(), ctx.options().file.clone())).unwrap();
    })
    .join()
    .unwrap();
    assert_eq!(rx.recv().unwrap(), (true, Some(file)));
}

#[test]
fn test_importer_state_persists_for_the_job() {
    let (tx, rx) = mpsc::channel();
    let options = Options::default().data(index_source()).importer(|ctx, _, _| {
        ctx.bump("state");
        Ok(yellow())
    });
    render(options, move |_, ctx| {
        tx.send(ctx.get("state").and_then(HostValue::as_f64)).unwrap();
    })
    .join()
    .unwrap();
    assert_eq!(rx.recv().unwrap(), Some(2.0));
}

#[test]
fn test_importer_errors() {
    let thrown = render_sync(
        Options::default()
            .data(index_source())
            .async_importer(|_, _, _, done| {
                done.complete(Err(HostError::message("doesn't exist!")))
            }),
    )
    .unwrap_err();
    assert!(thrown.to_string().contains("doesn't exist!"), "{}", thrown);

    let returned = render_sync(
        Options::default()
            .data(index_source())
            .importer(|_, _, _| Ok(HostValue::error("doesn't exist!"))),
    )
    .unwrap_err();
    assert!(matches!(returned, RenderError::Importer { .. }), "{:?}", returned);
    assert!(returned.to_string().contains("doesn't exist!"));

    let unknown = render_sync(
        Options::default()
            .data(index_source())
            .importer(|_, _, _| Err(HostError::Unknown)),
    )
    .unwrap_err();
    assert!(unknown.to_string().contains("unexpected error"), "{}", unknown);
}

#[test]
fn test_non_string_contents_rejected() {
    let err = render_sync(Options::default().data(index_source()).importer(|_, _, _| {
        Ok(HostValue::object([("contents", HostValue::from(1.0))]))
    }))
    .unwrap_err();
    assert!(
        err.to_string().contains("returned value of `contents` must be a string"),
        "{}",
        err
    );
}

#[test]
fn test_importer_completing_from_another_thread() {
    let options = Options::default().data(index_source()).async_importer(|_, _, _, done| {
        thread::spawn(move || done.complete(Ok(yellow())));
    });
    assert_eq!(css(options), YELLOW);
}

#[test]
fn test_ambiguous_native_import() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("theme.scss"), "a { b: c; }").unwrap();
    fs::write(dir.path().join("_theme.scss"), "a { b: d; }").unwrap();
    let err = render_sync(
        Options::default()
            .data("@import \"theme\";")
            .include_path(dir.path().to_string_lossy().into_owned()),
    )
    .unwrap_err();
    assert!(
        err.to_string().contains("It's not clear which file to import for '@import \"theme\"'."),
        "{}",
        err
    );
}

#[test]
fn test_missing_import_is_a_compile_error() {
    let err = render_sync(Options::default().data("@import \"does-not-exist\";")).unwrap_err();
    assert_eq!(err.status(), 1);
    assert!(err.location().is_some());
    assert!(err.to_string().contains("File to import not found or unreadable: does-not-exist."));
}

#[test]
fn test_file_only_return_prefers_importing_directory() {
    let own = tempfile::tempdir().unwrap();
    let include = tempfile::tempdir().unwrap();
    fs::write(own.path().join("index.scss"), "@import \"anything\";").unwrap();
    fs::write(own.path().join("theme.scss"), "a { b: own; }").unwrap();
    fs::write(include.path().join("theme.scss"), "a { b: include; }").unwrap();
    let options = Options::default()
        .file(own.path().join("index.scss").to_string_lossy().into_owned())
        .include_path(include.path().to_string_lossy().into_owned())
        .importer(|_, _, _| Ok(HostValue::object([("file", HostValue::from("theme"))])));
    assert_eq!(css(options), "a {\n  b: own; }");
}
