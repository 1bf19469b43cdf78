//! The `pgmod` command line.
//!
//! ```text
//! pgmod [PATH] [--out-dir DIR] [--ext-version V] [--description TEXT]
//!       [--runtime FILE] [--include-dir DIR] [--no-build] [--json] [-v]
//! ```

pub mod logging;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pgmod_compiler::options::{DEFAULT_FACADE_PATH, DEFAULT_VERSION};
use pgmod_compiler::{compile, CompileError, CompileOptions, CompileReport};
use pgmod_types::{CompileErrors, PgmodError};

/// Compile a Go `package main` into a PostgreSQL extension.
#[derive(Parser, Debug, Clone)]
#[command(name = "pgmod", version)]
pub struct Cli {
    /// Module directory
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Staging directory [default: <PATH>/build]
    #[arg(long, value_name = "DIR", env = "PGMOD_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Extension version
    #[arg(long, value_name = "VERSION", env = "PGMOD_EXT_VERSION", default_value = DEFAULT_VERSION)]
    pub ext_version: String,

    /// Comment written to the control file
    #[arg(long, env = "PGMOD_DESCRIPTION")]
    pub description: Option<String>,

    /// Runtime source to template instead of the one in $GOPATH
    #[arg(long, value_name = "FILE", env = "PGMOD_RUNTIME")]
    pub runtime: Option<PathBuf>,

    /// PostgreSQL server include directory instead of asking pg_config
    #[arg(long, value_name = "DIR", env = "PGMOD_INCLUDE_DIR")]
    pub include_dir: Option<PathBuf>,

    /// Stage the files but skip `go build`
    #[arg(long)]
    pub no_build: bool,

    /// Print the report or diagnostics as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn to_options(&self) -> CompileOptions {
        CompileOptions {
            module_path: self.path.clone(),
            out_dir: self.out_dir.clone(),
            version: self.ext_version.clone(),
            description: self.description.clone(),
            runtime: self.runtime.clone(),
            include_dir: self.include_dir.clone(),
            facade_path: DEFAULT_FACADE_PATH.to_string(),
            build: !self.no_build,
        }
    }
}

/// Compile the module the command line names.
pub fn run(cli: &Cli) -> anyhow::Result<CompileReport> {
    let options = cli.to_options();
    compile(&options).with_context(|| format!("cannot compile {}", options.module_path.display()))
}

/// Process exit status for a failed run: the build's own status when it
/// exited with one, 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CompileError>() {
        Some(CompileError::BuildFailed { code: Some(code) }) => {
            u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
        }
        _ => 1,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Output
// ══════════════════════════════════════════════════════════════════════════════

pub fn print_report(cli: &Cli, report: &CompileReport, out: &mut impl Write) -> anyhow::Result<()> {
    if cli.json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    for warning in &report.warnings {
        eprintln!("{}", render_diagnostic("warning", warning));
    }
    writeln!(
        out,
        "staged {} function(s) of {} in {}",
        report.functions.len(),
        report.module,
        report.out_dir.display()
    )?;
    for function in &report.functions {
        writeln!(out, "  {} -> {}", function.name, function.sql_name)?;
    }
    if report.built {
        writeln!(out, "built {}.so", report.module)?;
    }
    Ok(())
}

pub fn print_error(cli: &Cli, err: &anyhow::Error, out: &mut impl Write) -> anyhow::Result<()> {
    let diagnostics = err
        .downcast_ref::<CompileError>()
        .and_then(CompileError::diagnostics);
    match diagnostics {
        Some(diagnostics) if cli.json => {
            serde_json::to_writer_pretty(&mut *out, diagnostics)?;
            writeln!(out)?;
        }
        Some(diagnostics) => eprintln!("{}", render_diagnostics(diagnostics)),
        None => eprintln!("error: {err:#}"),
    }
    Ok(())
}

/// Human-readable form of every diagnostic, each with its source line.
pub fn render_diagnostics(diagnostics: &CompileErrors) -> String {
    let mut blocks: Vec<String> = diagnostics
        .warnings
        .iter()
        .map(|w| render_diagnostic("warning", w))
        .chain(diagnostics.errors.iter().map(|e| render_diagnostic("error", e)))
        .collect();
    let hidden = diagnostics.total_errors.saturating_sub(diagnostics.errors.len());
    if hidden > 0 {
        blocks.push(format!("... and {hidden} more error(s)"));
    }
    blocks.join("\n")
}

fn render_diagnostic(level: &str, diagnostic: &PgmodError) -> String {
    let mut text = format!("{level}: {diagnostic}");
    if !diagnostic.source_line.is_empty() {
        text.push_str(&format!(
            "\n  {:>4} | {}",
            diagnostic.span.start_line, diagnostic.source_line
        ));
    }
    text
}
