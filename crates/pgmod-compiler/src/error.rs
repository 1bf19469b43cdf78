//! Compiler error types.

use std::io;
use std::path::PathBuf;

use pgmod_codegen::CodegenError;
use pgmod_types::CompileErrors;
use thiserror::Error;

/// Everything that can stop a compile.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Lexer, parser, module-structure or classification diagnostics.
    #[error("{0}")]
    Diagnostics(CompileErrors),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "package github.com/paulhatch/plgo not installed (looked for {})\nplease install it with: go get -u github.com/paulhatch/plgo/plgo",
        display_paths(.searched)
    )]
    RuntimeNotFound { searched: Vec<PathBuf> },

    #[error("cannot run pg_config: {0}")]
    PgConfig(String),

    #[error("cannot start go build: {0}")]
    BuildSpawn(#[source] io::Error),

    #[error("go build failed with {}", describe_status(.code))]
    BuildFailed { code: Option<i32> },
}

impl CompileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }

    /// The structured diagnostics, if this error carries any.
    pub fn diagnostics(&self) -> Option<&CompileErrors> {
        match self {
            CompileError::Diagnostics(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<CompileErrors> for CompileError {
    fn from(errors: CompileErrors) -> Self {
        CompileError::Diagnostics(errors)
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no GOPATH entries".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

/// Compiler result type alias.
pub type CompileResult<T> = Result<T, CompileError>;
