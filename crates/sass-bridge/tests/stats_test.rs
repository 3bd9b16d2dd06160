/*
 * stats_test.rs
 * Copyright (c) 2025 Posit, PBC
 */

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use pretty_assertions::assert_eq;
use sass_bridge::{CompileJob, Options, render_sync};

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(relative)
}

fn slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis()
}

#[test]
fn test_timestamps() {
    let before = now_ms();
    let options = Options::default().file(slash(&fixture("include-files/index.scss")));
    let output = render_sync(options).unwrap();
    let stats = output.stats;
    assert!(u128::from(stats.start) >= before);
    assert!(stats.end >= stats.start);
    assert_eq!(stats.end - stats.start, stats.duration);
}

#[test]
fn test_entry_and_included_files() {
    let index = fixture("include-files/index.scss");
    let output = render_sync(Options::default().file(slash(&index))).unwrap();
    assert_eq!(output.stats.entry, slash(&index));
    assert_eq!(
        output.stats.included_files,
        vec![
            slash(&index),
            slash(&fixture("include-files/foo.scss")),
            slash(&fixture("include-files/bar.scss")),
        ]
    );
}

#[test]
fn test_entry_only_without_imports() {
    let index = fixture("simple/index.scss");
    let output = render_sync(Options::default().file(slash(&index))).unwrap();
    assert_eq!(output.stats.included_files, vec![slash(&index)]);
}

#[test]
fn test_data_entry() {
    let output = render_sync(Options::default().data("div { color: red; }")).unwrap();
    assert_eq!(output.stats.entry, "data");
    assert!(output.stats.included_files.is_empty());
}

#[test]
fn test_data_with_imports_lists_imported_files() {
    let dir = fixture("include-files");
    let options = Options::default()
        .data("@import \"foo\";\n@import \"bar\";")
        .include_path(slash(&dir));
    let output = render_sync(options).unwrap();
    assert_eq!(
        output.stats.included_files,
        vec![slash(&dir.join("foo.scss")), slash(&dir.join("bar.scss"))]
    );
}

#[test]
fn test_repeated_imports_listed_once() {
    let options = Options::default().file(slash(&fixture("depth-first/index.scss")));
    let output = render_sync(options).unwrap();
    let files = &output.stats.included_files;
    let common = slash(&fixture("depth-first/_common.scss"));
    assert_eq!(files.iter().filter(|f| **f == common).count(), 1);
    assert_eq!(files.len(), 8);
}

#[test]
fn test_stats_recorded_when_compile_fails() {
    let mut job = CompileJob::new(Options::default().data("a { b: $missing; }")).unwrap();
    assert!(job.run().is_err());
    let stats = job.stats().unwrap();
    assert_eq!(stats.entry, "data");
    assert_eq!(stats.end - stats.start, stats.duration);
}

#[test]
fn test_stats_serialize_camel_case() {
    let output = render_sync(Options::default().data("a { b: c; }")).unwrap();
    let json = serde_json::to_value(&output.stats).unwrap();
    assert_eq!(json["entry"], "data");
    assert!(json["includedFiles"].as_array().unwrap().is_empty());
    assert!(json["duration"].is_u64());
}
