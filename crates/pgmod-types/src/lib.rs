//! Shared types for the pgmod compiler.
//!
//! This crate defines the Go-subset AST, source spans, structured
//! diagnostics, the datum type table that decides which Go types can cross
//! the PostgreSQL boundary, and the function model produced by
//! classification and consumed by code generation.

mod error;
mod span;
pub mod ast;
pub mod datum;
pub mod model;
pub mod names;

pub use datum::{Datum, TypeTag};
pub use error::{CompileErrors, ErrorCategory, ErrorCode, PgmodError, Severity, MAX_ERRORS};
pub use model::{Function, FunctionKind, GeneratedArtifact, Param, Signature};
pub use span::{SourceFile, Span};

/// Result type used throughout the pgmod front end.
pub type Result<T> = std::result::Result<T, PgmodError>;
