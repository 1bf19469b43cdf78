//! Codegen error types.

use thiserror::Error;

/// Errors that can occur while generating glue, DDL or packaging files.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Two exported functions would register the same SQL routine.
    #[error("functions {first} and {second} both register routine {routine}")]
    DuplicateRoutine {
        routine: String,
        first: String,
        second: String,
    },

    /// The runtime source cannot be templated.
    #[error("runtime source {0}")]
    RuntimeTemplate(String),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
