//! Module loading: read a directory of `.go` files, lex and parse each one,
//! and check they form a single `package main`.

use std::fs;
use std::path::Path;

use pgmod_lexer::{Lexer, Token};
use pgmod_parser::Parser;
use pgmod_types::ast::SourceUnit;
use pgmod_types::{CompileErrors, ErrorCode, PgmodError, SourceFile};
use tracing::debug;

use crate::error::{CompileError, CompileResult};

/// One parsed file, with its tokens kept for rewriting.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub source: SourceFile,
    /// Full token stream, comments included.
    pub tokens: Vec<Token>,
    pub unit: SourceUnit,
}

impl ParsedFile {
    /// The identifier the facade package is bound to in this file: its
    /// import alias, or the last path element when imported plainly.
    /// Files that do not import it fall back to that last element too.
    pub fn facade_ident(&self, facade_path: &str) -> String {
        self.unit
            .imports
            .iter()
            .find(|i| i.path == facade_path)
            .map(|i| i.local_name().to_string())
            .unwrap_or_else(|| default_ident(facade_path).to_string())
    }
}

fn default_ident(import_path: &str) -> &str {
    import_path.rsplit('/').next().unwrap_or(import_path)
}

/// A loaded module: every non-test `.go` file of one directory.
#[derive(Debug, Clone)]
pub struct ModuleSource {
    /// Base name of the module directory; names the extension and the `.so`.
    pub name: String,
    /// Files in file-name order.
    pub files: Vec<ParsedFile>,
}

impl ModuleSource {
    /// Load the module in `dir`.
    pub fn load(dir: &Path) -> CompileResult<Self> {
        let abs = fs::canonicalize(dir).map_err(|e| CompileError::io(dir, e))?;
        let name = abs
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "module".to_string());

        let mut paths = Vec::new();
        let entries = fs::read_dir(&abs).map_err(|e| CompileError::io(&abs, e))?;
        for entry in entries {
            let path = entry.map_err(|e| CompileError::io(&abs, e))?.path();
            let is_source = path.extension().is_some_and(|ext| ext == "go")
                && path.is_file()
                && !path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().ends_with("_test.go"));
            if is_source {
                paths.push(path);
            }
        }
        paths.sort();

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let text = fs::read_to_string(&path).map_err(|e| CompileError::io(&path, e))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            debug!(file = %file_name, bytes = text.len(), "read source file");
            sources.push(SourceFile::new(file_name, text));
        }

        Self::from_sources(name, sources)
    }

    /// Parse already-read sources as one module named `name`.
    pub fn from_sources(name: impl Into<String>, sources: Vec<SourceFile>) -> CompileResult<Self> {
        let name = name.into();
        let mut errors = CompileErrors::empty();
        if sources.is_empty() {
            errors.push_error(PgmodError::detached(
                &name,
                ErrorCode::NO_SOURCE_FILES,
                format!("no Go source files in module {name}"),
            ));
            return Err(errors.into());
        }

        let mut files = Vec::with_capacity(sources.len());
        for source in sources {
            let lexed = Lexer::new(&source).lex();
            let tokens = lexed.tokens;
            let parsed = Parser::new(tokens.clone(), &source).parse();
            errors.extend(lexed.errors);
            errors.extend(parsed.errors);
            if let Some(unit) = parsed.unit {
                files.push(ParsedFile {
                    source,
                    tokens,
                    unit,
                });
            }
        }
        if errors.has_errors() {
            return Err(errors.into());
        }

        check_single_main_package(&files)?;
        Ok(Self { name, files })
    }
}

fn check_single_main_package(files: &[ParsedFile]) -> CompileResult<()> {
    let Some((head, rest)) = files.split_first() else {
        return Ok(());
    };
    let mut errors = CompileErrors::empty();
    let first = &head.unit.package;
    for file in rest {
        let package = &file.unit.package;
        if package.name != first.name {
            errors.push_error(file_error(
                file,
                ErrorCode::MULTIPLE_PACKAGES,
                format!(
                    "found packages {} ({}) and {} ({})",
                    first.name, head.source.name, package.name, file.source.name
                ),
                package.span,
            ));
        }
    }
    if !errors.has_errors() && first.name != "main" {
        errors.push_error(
            file_error(
                head,
                ErrorCode::NOT_PACKAGE_MAIN,
                format!("package {} is not main", first.name),
                first.span,
            )
            .with_suggestion("an extension module must be `package main`"),
        );
    }
    if errors.has_errors() {
        return Err(errors.into());
    }
    Ok(())
}

/// Build a diagnostic pointing into `file`.
pub(crate) fn file_error(
    file: &ParsedFile,
    code: ErrorCode,
    message: impl Into<String>,
    span: pgmod_types::Span,
) -> PgmodError {
    let source_line = file.source.line(span.start_line).unwrap_or("").to_string();
    PgmodError::new(&file.source.name, code, message, span, source_line)
}
