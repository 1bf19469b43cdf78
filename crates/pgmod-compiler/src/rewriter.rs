//! Source rewriting: merge the module's files into one `package main`
//! source without the facade package, with every exported routine renamed
//! to its internal name.
//!
//! The rewrite works on token byte ranges, so everything it does not touch
//! (formatting, comments, bodies) is copied through verbatim.

use std::collections::HashMap;
use std::ops::Range;

use pgmod_lexer::{Token, TokenKind};
use pgmod_types::ast::{Decl, DeclKeyword, ImportSpec};
use tracing::debug;

use crate::classifier::ClassifiedModule;
use crate::module::{ModuleSource, ParsedFile};

/// Exported name → internal name.
pub type Renames<'a> = HashMap<&'a str, String>;

/// Produce the merged source staged as `package.go`.
pub fn rewrite_module(module: &ModuleSource, classified: &ClassifiedModule) -> String {
    let renames: Renames<'_> = classified
        .functions
        .iter()
        .map(|f| (f.name(), f.signature().internal_name()))
        .collect();

    let mut imports: Vec<String> = Vec::new();
    let mut bodies = Vec::new();
    for file in &module.files {
        for import in &file.unit.imports {
            if import.path == classified.facade_path {
                continue;
            }
            let line = import_line(import);
            if !imports.contains(&line) {
                imports.push(line);
            }
        }

        let facade = file
            .unit
            .imports
            .iter()
            .any(|i| i.path == classified.facade_path)
            .then(|| file.facade_ident(&classified.facade_path));
        let body = rewrite_file(file, facade.as_deref(), &renames);
        debug!(file = %file.source.name, bytes = body.len(), "rewrote file");
        if !body.is_empty() {
            bodies.push(body);
        }
    }

    merge(&imports, &bodies)
}

/// Rewrite the declarations of one file, dropping its package clause and imports.
///
/// `facade` is the identifier the file binds the facade package to, if it
/// imports it at all.
pub fn rewrite_file(file: &ParsedFile, facade: Option<&str>, renames: &Renames<'_>) -> String {
    let source = &file.source;
    let tokens: Vec<&Token> = file
        .tokens
        .iter()
        .filter(|t| !matches!(t.kind, TokenKind::Comment(_) | TokenKind::Newline | TokenKind::Eof))
        .collect();

    let header = header_len(&tokens);
    let body_start = match header.checked_sub(1) {
        Some(last) => source.byte_range(tokens[last].span).end,
        None => 0,
    };
    let protected = protected_ranges(file);

    let mut edits: Vec<(Range<usize>, &str)> = Vec::new();
    let mut i = header;
    while i < tokens.len() {
        let Some(name) = tokens[i].ident() else {
            i += 1;
            continue;
        };
        let after_dot = i > 0 && tokens[i - 1].kind == TokenKind::Dot;

        if facade == Some(name)
            && !after_dot
            && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Dot)
            && tokens.get(i + 2).is_some_and(|t| t.ident().is_some())
        {
            // `plgo.X` -> `X`
            let start = source.byte_range(tokens[i].span).start;
            let end = source.byte_range(tokens[i + 1].span).end;
            edits.push((start..end, ""));
            i += 3;
            continue;
        }

        if let Some(internal) = renames.get(name) {
            let range = source.byte_range(tokens[i].span);
            let is_protected = protected.iter().any(|p| p.contains(&range.start));
            // composite literal keys and labels
            let before_colon = tokens
                .get(i + 1)
                .is_some_and(|t| t.kind == TokenKind::Operator(":"));
            if !after_dot && !is_protected && !before_colon {
                edits.push((range, internal.as_str()));
            }
        }
        i += 1;
    }

    let text = &source.source;
    let mut out = String::with_capacity(text.len().saturating_sub(body_start));
    let mut cursor = body_start;
    for (range, replacement) in edits {
        out.push_str(&text[cursor..range.start]);
        out.push_str(replacement);
        cursor = range.end;
    }
    out.push_str(&text[cursor.min(text.len())..]);
    out.trim().to_string()
}

/// Number of leading significant tokens that make up the package clause
/// and import declarations.
fn header_len(tokens: &[&Token]) -> usize {
    let kind = |i: usize| tokens.get(i).map(|t| &t.kind);
    let skip_semicolons = |mut i: usize| {
        while kind(i) == Some(&TokenKind::Semicolon) {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if kind(i) == Some(&TokenKind::Package) {
        i += 1;
        if matches!(kind(i), Some(TokenKind::Ident(_))) {
            i += 1;
        }
    }
    i = skip_semicolons(i);

    while kind(i) == Some(&TokenKind::Import) {
        i += 1;
        if kind(i) == Some(&TokenKind::LParen) {
            while i < tokens.len() && kind(i) != Some(&TokenKind::RParen) {
                i += 1;
            }
        } else {
            while i < tokens.len() && !matches!(kind(i), Some(TokenKind::String(_) | TokenKind::RawString(_))) {
                i += 1;
            }
        }
        i = skip_semicolons((i + 1).min(tokens.len()));
    }
    i
}

/// Byte ranges where an exported routine name means something else:
/// method names and `type` declarations (struct fields, interface methods).
fn protected_ranges(file: &ParsedFile) -> Vec<Range<usize>> {
    file.unit
        .decls
        .iter()
        .filter_map(|decl| match decl {
            Decl::Func(f) if f.receiver.is_some() => Some(file.source.byte_range(f.name.span)),
            Decl::Other(o) if o.keyword == DeclKeyword::Type => Some(file.source.byte_range(o.span)),
            _ => None,
        })
        .collect()
}

fn import_line(import: &ImportSpec) -> String {
    match &import.alias {
        Some(alias) => format!("{} \"{}\"", alias.name, import.path),
        None => format!("\"{}\"", import.path),
    }
}

fn merge(imports: &[String], bodies: &[String]) -> String {
    let mut out = String::from("package main\n");
    if !imports.is_empty() {
        out.push_str("\nimport (\n");
        for import in imports {
            out.push('\t');
            out.push_str(import);
            out.push('\n');
        }
        out.push_str(")\n");
    }
    for body in bodies {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgmod_types::SourceFile;

    fn parsed(text: &str) -> ParsedFile {
        let module = ModuleSource::from_sources("t", vec![SourceFile::new("a.go", text)]).unwrap();
        module.files.into_iter().next().unwrap()
    }

    #[test]
    fn test_header_covers_grouped_imports() {
        let file = parsed("package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc f() {}\n");
        assert_eq!(rewrite_file(&file, None, &Renames::new()), "func f() {}");
    }

    #[test]
    fn test_header_covers_aliased_import() {
        let file = parsed("package main\nimport pg \"github.com/paulhatch/plgo\"\nvar x = 1\n");
        assert_eq!(rewrite_file(&file, Some("pg"), &Renames::new()), "var x = 1");
    }

    #[test]
    fn test_merge_without_imports() {
        assert_eq!(
            merge(&[], &["func f() {}".to_string()]),
            "package main\n\nfunc f() {}\n"
        );
    }
}
