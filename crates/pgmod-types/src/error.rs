use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors reported per file before the front end gives up.
pub const MAX_ERRORS: usize = 20;

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Type,
    Trigger,
    Module,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_BRACE: Self = Self(101);
    pub const UNTERMINATED_LITERAL: Self = Self(102);
    pub const UNEXPECTED_CHARACTER: Self = Self(103);
    pub const MISSING_PACKAGE_CLAUSE: Self = Self(104);

    // ── Type errors (E200–E299) ──
    pub const UNSUPPORTED_PARAM_TYPE: Self = Self(200);
    pub const UNSUPPORTED_RETURN_TYPE: Self = Self(201);
    pub const MULTIPLE_RETURN_VALUES: Self = Self(202);
    pub const UNNAMED_PARAMETER: Self = Self(203);
    pub const RESERVED_PARAMETER_NAME: Self = Self(204);

    // ── Trigger shape errors (E300–E399) ──
    pub const TRIGGER_DATA_NOT_FIRST: Self = Self(300);
    pub const TRIGGER_DATA_GROUPED: Self = Self(301);
    pub const TRIGGER_ROW_WITHOUT_DATA: Self = Self(302);
    pub const TRIGGER_DATA_WITHOUT_ROW: Self = Self(303);

    // ── Module errors (E400–E499) ──
    pub const NO_SOURCE_FILES: Self = Self(400);
    pub const MULTIPLE_PACKAGES: Self = Self(401);
    pub const NOT_PACKAGE_MAIN: Self = Self(402);
    pub const INTERNAL_NAME_COLLISION: Self = Self(403);
    /// Warning: an exported method is not a routine.
    pub const EXPORTED_METHOD: Self = Self(404);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Type,
            300..=399 => ErrorCategory::Trigger,
            400..=499 => ErrorCategory::Module,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured pgmod diagnostic.
///
/// Serialized as-is by `pgmod --json`, so field names are part of the
/// CLI contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PgmodError {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E200).
    pub code: ErrorCode,
    /// Error severity.
    pub severity: Severity,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl PgmodError {
    /// Create a new error.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Create an error that is not tied to a source location (module-level).
    pub fn detached(file: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(file, code, message, Span::point(1, 1), "")
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for PgmodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (hint: {suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for PgmodError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Type => write!(f, "type"),
            Self::Trigger => write!(f, "trigger"),
            Self::Module => write!(f, "module"),
        }
    }
}

/// A collection of diagnostics from one front-end pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<PgmodError>,
    pub warnings: Vec<PgmodError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    /// Create an empty result (no errors).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Returns `true` once the error cap is reached.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: PgmodError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Add a warning.
    pub fn push_warning(&mut self, mut warning: PgmodError) {
        warning.severity = Severity::Warning;
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Move every diagnostic from `other` into `self`.
    pub fn extend(&mut self, other: CompileErrors) {
        // errors dropped by `other`'s own cap still count
        let dropped = other.total_errors.saturating_sub(other.errors.len());
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += dropped;
        for warning in other.warnings {
            self.push_warning(warning);
        }
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        let hidden = self.total_errors.saturating_sub(self.errors.len());
        if hidden > 0 {
            write!(f, "\n... and {hidden} more error(s)")?;
        }
        Ok(())
    }
}
