//! Command line tests: argument parsing, option mapping, exit codes and
//! output rendering.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use pgmod_cli::{exit_code, print_error, print_report, render_diagnostics, run, Cli};
use pgmod_compiler::CompileError;
use pgmod_types::{CompileErrors, ErrorCode, PgmodError, Span};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("pgmod").chain(args.iter().copied()))
        .unwrap_or_else(|e| panic!("parse failed: {e}"))
}

const RUNTIME: &str = "package plgo\n\n/*\n#cgo CFLAGS: -I/usr/include/postgresql/server\n//{funcdec}\n*/\nimport \"C\"\n";

/// A module dir `demo` holding `source`, and a runtime next to it.
fn fixture(source: &str) -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let module = dir.path().join("demo");
    fs::create_dir(&module).unwrap();
    fs::write(module.join("main.go"), source).unwrap();
    let runtime = dir.path().join("pl.go");
    fs::write(&runtime, RUNTIME).unwrap();
    (dir, module, runtime)
}

fn staged_cli(module: &PathBuf, runtime: &PathBuf, extra: &[&str]) -> Cli {
    let mut args = vec![
        module.to_str().unwrap(),
        "--runtime",
        runtime.to_str().unwrap(),
        "--include-dir",
        "/opt/pg/server",
        "--no-build",
    ];
    args.extend_from_slice(extra);
    parse(&args)
}

// ─────────────────────────────────────────────────────────────────────
// Arguments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_defaults() {
    let cli = parse(&[]);
    let options = cli.to_options();
    assert_eq!(options.module_path, PathBuf::from("."));
    assert_eq!(options.version, "0.1");
    assert_eq!(options.facade_path, "github.com/paulhatch/plgo");
    assert!(options.build);
    assert_eq!(options.out_dir, None);
    assert!(!cli.json);
    assert!(!cli.verbose);
}

#[test]
fn test_flags_map_onto_options() {
    let cli = parse(&[
        "ext",
        "--out-dir",
        "/tmp/stage",
        "--ext-version",
        "2.0",
        "--description",
        "my routines",
        "--runtime",
        "/src/pl.go",
        "--include-dir",
        "/pg/include",
        "--no-build",
        "--json",
        "-v",
    ]);
    let options = cli.to_options();
    assert_eq!(options.module_path, PathBuf::from("ext"));
    assert_eq!(options.out_dir, Some(PathBuf::from("/tmp/stage")));
    assert_eq!(options.version, "2.0");
    assert_eq!(options.description.as_deref(), Some("my routines"));
    assert_eq!(options.runtime, Some(PathBuf::from("/src/pl.go")));
    assert_eq!(options.include_dir, Some(PathBuf::from("/pg/include")));
    assert!(!options.build);
    assert!(cli.json);
    assert!(cli.verbose);
}

#[test]
fn test_unknown_flag_rejected() {
    assert!(Cli::try_parse_from(["pgmod", "--frobnicate"]).is_err());
}

// ─────────────────────────────────────────────────────────────────────
// Exit codes
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_exit_code_forwards_build_status() {
    let err = anyhow::Error::new(CompileError::BuildFailed { code: Some(2) });
    assert_eq!(exit_code(&err), 2);
}

#[test]
fn test_exit_code_defaults_to_one() {
    let signalled = anyhow::Error::new(CompileError::BuildFailed { code: None });
    assert_eq!(exit_code(&signalled), 1);
    let out_of_range = anyhow::Error::new(CompileError::BuildFailed { code: Some(300) });
    assert_eq!(exit_code(&out_of_range), 1);
    let other = anyhow::anyhow!("boom");
    assert_eq!(exit_code(&other), 1);
}

#[test]
fn test_exit_code_survives_context() {
    let err = anyhow::Error::new(CompileError::BuildFailed { code: Some(3) }).context("cannot compile x");
    assert_eq!(exit_code(&err), 3);
}

// ─────────────────────────────────────────────────────────────────────
// Runs
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_run_and_print_json_report() {
    let (_dir, module, runtime) = fixture("package main\n\nfunc ConcatAll(a, b string) string { return a + b }\n");
    let cli = staged_cli(&module, &runtime, &["--json"]);
    let report = run(&cli).unwrap_or_else(|e| panic!("{e:#}"));

    let mut out = Vec::new();
    print_report(&cli, &report, &mut out).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["module"], "demo");
    assert_eq!(json["functions"][0]["name"], "ConcatAll");
    assert_eq!(json["functions"][0]["kind"], "scalar");
    assert_eq!(json["functions"][0]["sql_name"], "concat_all");
    assert_eq!(json["built"], false);
    assert!(module.join("build/demo--0.1.sql").is_file());
}

#[test]
fn test_print_text_report() {
    let (_dir, module, runtime) = fixture("package main\n\nfunc Meh() {}\n");
    let cli = staged_cli(&module, &runtime, &[]);
    let report = run(&cli).unwrap();
    let mut out = Vec::new();
    print_report(&cli, &report, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("staged 1 function(s) of demo in "), "{text}");
    assert!(text.contains("  Meh -> meh\n"), "{text}");
}

#[test]
fn test_failed_run_prints_json_diagnostics() {
    let (_dir, module, runtime) = fixture("package main\n\nfunc Count(m map[string]int) int { return 0 }\n");
    let cli = staged_cli(&module, &runtime, &["--json"]);
    let err = run(&cli).unwrap_err();
    assert_eq!(exit_code(&err), 1);

    let mut out = Vec::new();
    print_error(&cli, &err, &mut out).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["errors"][0]["code"], 200);
    assert_eq!(json["errors"][0]["category"], "type");
    assert!(!module.join("build").exists());
}

#[test]
fn test_render_diagnostics_with_source_line() {
    let mut diagnostics = CompileErrors::empty();
    diagnostics.push_error(PgmodError::new(
        "main.go",
        ErrorCode::UNSUPPORTED_PARAM_TYPE,
        "Count: parameter m has unsupported type map[string]int",
        Span::new(3, 14, 3, 27),
        "func Count(m map[string]int) int { return 0 }",
    ));
    let text = render_diagnostics(&diagnostics);
    assert_eq!(
        text,
        "error: main.go:3:14: E200 [type] Count: parameter m has unsupported type map[string]int\n     3 | func Count(m map[string]int) int { return 0 }"
    );
}
