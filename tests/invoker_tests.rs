//! Integration tests for running `ocp-index`.
//!
//! A shell script stands in for the real binary so the tests can check what
//! the invoker passes and how it reads the tool's answer.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use ocp_complete::config::Config;
use ocp_complete::editor::Document;
use ocp_complete::ocp::invoker::{IndexTool, Invocation, OcpIndex};
use ocp_complete::ocp::{OcpError, Subcommand};
use ocp_complete::plugin::OcpPlugin;

/// Scripts are written and spawned one test at a time so no child inherits
/// a script still open for writing.
static SERIAL: Mutex<()> = Mutex::new(());

/// Writes an executable `ocp-index` script into a fresh directory.
fn fake_tool(body: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ocp-index");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    (dir, path)
}

fn lock() -> std::sync::MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[test]
fn test_stdout_is_returned_trimmed() {
    let _guard = lock();
    let (_dir, bin) = fake_tool("printf '\\n  int -> string  \\n\\n'");

    let output = OcpIndex::with_binary(&bin)
        .run(&Invocation::new(Subcommand::Type, "string_of_int"))
        .expect("run");

    assert_eq!(output, "int -> string");
}

#[test]
fn test_any_stderr_fails_the_call() {
    let _guard = lock();
    let (_dir, bin) = fake_tool("echo 'List.map map value int'\necho '  Unbound module Foo  ' >&2");

    let err = OcpIndex::with_binary(&bin)
        .run(&Invocation::new(Subcommand::Complete, "Foo.x"))
        .expect_err("stderr output");

    match err {
        OcpError::ToolReported(message) => assert_eq!(message, "Unbound module Foo"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_exit_status_is_ignored() {
    let _guard = lock();
    let (_dir, bin) = fake_tool("echo partial\nexit 3");

    let output = OcpIndex::with_binary(&bin)
        .run(&Invocation::new(Subcommand::Type, "x"))
        .expect("run");

    assert_eq!(output, "partial");
}

#[test]
fn test_arguments_reach_the_tool() {
    let _guard = lock();
    let (dir, bin) = fake_tool("for arg in \"$@\"; do echo \"$arg\"; done");

    let invocation = Invocation::new(Subcommand::Complete, "List.ma")
        .with_includes([dir.path()])
        .with_module(Some("Main".to_string()))
        .with_context(Some("main.ml:0,15".to_string()))
        .with_extra_args(["--format", "%q %p %k %t"]);

    let output = OcpIndex::with_binary(&bin).run(&invocation).expect("run");
    let expected: Vec<String> = invocation
        .args()
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    assert_eq!(output.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn test_runs_in_first_include_directory() {
    let _guard = lock();
    let (dir, bin) = fake_tool("pwd -P");
    let other = tempfile::tempdir().expect("tempdir");

    let invocation = Invocation::new(Subcommand::Type, "x")
        .with_includes([dir.path(), other.path()]);
    let output = OcpIndex::with_binary(&bin).run(&invocation).expect("run");

    let expected = fs::canonicalize(dir.path()).expect("canonicalize");
    assert_eq!(Path::new(&output), expected.as_path());
}

#[test]
fn test_missing_binary_is_a_spawn_error() {
    let _guard = lock();
    let dir = tempfile::tempdir().expect("tempdir");
    let bin = dir.path().join("ocp-index");

    let err = OcpIndex::with_binary(&bin)
        .run(&Invocation::new(Subcommand::Type, "x"))
        .expect_err("no binary");

    match err {
        OcpError::Spawn { binary, .. } => assert_eq!(binary, bin),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_configured_binary_drives_completion() {
    let _guard = lock();
    let (dir, bin) = fake_tool("echo 'Stdlib.print_int print_int value int -> unit'");

    let config = Config::parse(&format!("ocp_index_path = {:?}", bin.to_string_lossy()))
        .expect("config");
    let mut plugin = OcpPlugin::new(config.index_tool());

    let source = dir.path().join("main.ml");
    fs::write(&source, "let count = 1\nlet () = print_i").expect("write source");
    let doc = Document::open(&source).expect("open");
    plugin.on_load(&doc);

    let list = plugin
        .on_query_completions(&doc, "print_i", &[doc.len_chars()])
        .expect("list");

    assert_eq!(
        list.pairs(),
        vec![
            ("print_int\tvalue int -> unit", "print_int"),
            ("count\tlet", "count"),
        ]
    );
}

#[test]
fn test_type_lookup_through_real_process() {
    let _guard = lock();
    let (_dir, bin) = fake_tool("echo \"int -> unit\"");

    let plugin = OcpPlugin::new(OcpIndex::with_binary(&bin));
    let mut doc = Document::from_str("print_int 3").with_path("main.ml").with_cursor(3);

    assert_eq!(
        plugin.show_type(&mut doc).as_deref(),
        Some("Type: int -> unit")
    );
}
