//! Top-level and declaration parsing.
//!
//! Handles the package clause, import declarations, function declarations
//! (with their doc comments) and the extent of `type`/`var`/`const`
//! declarations.

use pgmod_lexer::TokenKind;
use pgmod_types::ast::*;
use pgmod_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Source unit
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a complete file: `PackageClause { ImportDecl } { TopLevelDecl }`.
    pub(crate) fn parse_source_unit(&mut self) -> Option<SourceUnit> {
        self.skip_separators();
        let start = self.current_span();
        if !self.check(&TokenKind::Package) {
            self.error_at_current(
                ErrorCode::MISSING_PACKAGE_CLAUSE,
                format!("expected 'package' clause, got '{}'", self.peek_kind()),
            );
            return None;
        }
        self.advance();
        let package = self.expect_identifier()?;
        self.expect_statement_end();

        let mut imports = Vec::new();
        while self.check(&TokenKind::Import) && !self.too_many_errors() {
            self.parse_import_decl(&mut imports);
            self.expect_statement_end();
        }

        let mut decls = Vec::new();
        self.skip_separators();
        while !self.at_end() && !self.too_many_errors() {
            let before = self.position();
            let decl = match self.peek_kind() {
                TokenKind::Func => self.parse_func_decl().map(Decl::Func),
                TokenKind::Type | TokenKind::Var | TokenKind::Const => {
                    self.parse_other_decl().map(Decl::Other)
                }
                TokenKind::Import => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        "imports must appear before other declarations",
                    );
                    None
                }
                other => {
                    let message = format!("expected declaration, got '{other}'");
                    self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                    None
                }
            };
            match decl {
                Some(decl) => {
                    decls.push(decl);
                    self.expect_statement_end();
                }
                None => {
                    self.synchronize();
                    if self.position() == before {
                        self.advance();
                    }
                }
            }
            self.skip_separators();
        }

        let span = start.merge(self.previous_span());
        Some(SourceUnit {
            package,
            imports,
            decls,
            span,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Imports
    // ══════════════════════════════════════════════════════════════════════════

    /// `import spec` or `import ( spec; spec )`.
    fn parse_import_decl(&mut self, imports: &mut Vec<ImportSpec>) {
        self.advance();
        if !self.eat(&TokenKind::LParen) {
            match self.parse_import_spec() {
                Some(spec) => imports.push(spec),
                None => self.synchronize(),
            }
            return;
        }
        loop {
            self.skip_separators();
            if self.check(&TokenKind::RParen) || self.at_end() {
                break;
            }
            match self.parse_import_spec() {
                Some(spec) => imports.push(spec),
                None => {
                    self.synchronize();
                    return;
                }
            }
        }
        self.expect(&TokenKind::RParen);
    }

    /// `[alias | . | _] "path"`
    fn parse_import_spec(&mut self) -> Option<ImportSpec> {
        let start = self.current_span();
        let alias = match self.peek_kind().clone() {
            TokenKind::Ident(name) => Some(Ident::new(name, self.advance().span)),
            TokenKind::Dot => Some(Ident::new(".", self.advance().span)),
            _ => None,
        };
        let path = match self.peek_kind().clone() {
            TokenKind::String(raw) | TokenKind::RawString(raw) => {
                self.advance();
                unquote(&raw)
            }
            other => {
                let message = format!("expected import path, got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                return None;
            }
        };
        Some(ImportSpec {
            alias,
            path,
            span: start.merge(self.previous_span()),
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Functions
    // ══════════════════════════════════════════════════════════════════════════

    /// `func [Receiver] Name [TypeParams] Parameters [Result] [Body]`
    fn parse_func_decl(&mut self) -> Option<FuncDecl> {
        let start = self.current_span();
        let doc = self.doc_comment(start.start_line);
        self.advance();

        let receiver = if self.check(&TokenKind::LParen) {
            Some(self.parse_parameters()?)
        } else {
            None
        };
        let name = self.expect_identifier()?;
        if self.check(&TokenKind::LBracket) {
            self.skip_balanced()?;
        }
        let params = self.parse_parameters()?;
        let results = self.parse_results()?;
        let body = if self.check(&TokenKind::LBrace) {
            Some(self.skip_balanced()?)
        } else {
            None
        };

        Some(FuncDecl {
            name,
            receiver,
            params,
            results,
            doc,
            body,
            span: start.merge(self.previous_span()),
        })
    }

    /// Collect the comment block that ends on the line directly above `line`.
    ///
    /// Only comments that start their own line count. Directives such as
    /// `//export Name` and `//go:noinline` are dropped.
    fn doc_comment(&self, line: u32) -> Option<String> {
        let mut expected_end = line.checked_sub(1)?;
        let mut block = Vec::new();
        for comment in self.comments.iter().rev() {
            if comment.span.end_line > expected_end {
                continue;
            }
            if comment.span.end_line < expected_end || !self.starts_line(comment.span) {
                break;
            }
            block.push(comment);
            expected_end = comment.span.start_line.saturating_sub(1);
        }

        let mut lines = Vec::new();
        for comment in block.iter().rev() {
            let TokenKind::Comment(text) = &comment.kind else {
                continue;
            };
            if let Some(body) = text.strip_prefix("//") {
                if is_directive(body) {
                    continue;
                }
                lines.push(body.strip_prefix(' ').unwrap_or(body).to_string());
            } else {
                let inner = text
                    .strip_prefix("/*")
                    .and_then(|t| t.strip_suffix("*/"))
                    .unwrap_or(text);
                lines.extend(inner.lines().map(|l| l.trim().to_string()));
            }
        }

        let doc = lines.join("\n");
        let doc = doc.trim_matches('\n');
        (!doc.is_empty()).then(|| doc.to_string())
    }

    /// Whether only whitespace precedes `span` on its line.
    fn starts_line(&self, span: pgmod_types::Span) -> bool {
        let text = self.source_file.line(span.start_line).unwrap_or("");
        let indent = text.len() - text.trim_start().len();
        indent + 1 == span.start_col as usize
    }

    // ══════════════════════════════════════════════════════════════════════════
    // type / var / const
    // ══════════════════════════════════════════════════════════════════════════

    /// Consume a `type`, `var` or `const` declaration up to its terminating
    /// newline or `;`, recording the names each spec declares.
    fn parse_other_decl(&mut self) -> Option<OtherDecl> {
        let start = self.current_span();
        let keyword = match self.advance().kind {
            TokenKind::Type => DeclKeyword::Type,
            TokenKind::Var => DeclKeyword::Var,
            _ => DeclKeyword::Const,
        };

        let mut names = Vec::new();
        let mut depth = 0i32;
        let mut grouped = false;
        let mut at_spec_start = true;
        let mut last_was_name = false;

        loop {
            let kind = self.peek_kind().clone();
            match kind {
                TokenKind::Eof if depth > 0 => {
                    self.error_at(
                        ErrorCode::UNCLOSED_BRACE,
                        format!("'{keyword}' declaration is never closed"),
                        start,
                    );
                    return None;
                }
                TokenKind::Eof => break,
                TokenKind::Semicolon if depth == 0 => break,
                TokenKind::Newline if depth == 0 => {
                    if self.previous().is_some_and(|t| t.kind.ends_statement()) {
                        break;
                    }
                    self.advance();
                    continue;
                }
                _ => {}
            }

            let spec_level = if grouped { depth == 1 } else { depth == 0 };
            match &kind {
                TokenKind::Ident(name) if spec_level && at_spec_start => {
                    names.push(Ident::new(name.clone(), self.current_span()));
                    at_spec_start = false;
                    last_was_name = true;
                }
                TokenKind::Comma if spec_level && last_was_name => {
                    at_spec_start = true;
                    last_was_name = false;
                }
                TokenKind::LParen if depth == 0 && names.is_empty() && !grouped => {
                    grouped = true;
                    at_spec_start = true;
                    last_was_name = false;
                }
                TokenKind::Newline | TokenKind::Semicolon if grouped && depth == 1 => {
                    at_spec_start = true;
                    last_was_name = false;
                }
                _ => {
                    at_spec_start = false;
                    last_was_name = false;
                }
            }
            depth += kind.depth_delta();
            self.advance();
        }

        Some(OtherDecl {
            keyword,
            names,
            span: start.merge(self.previous_span()),
        })
    }
}

/// Strip the quotes from an import path literal.
fn unquote(raw: &str) -> String {
    let inner = if raw.len() >= 2 { &raw[1..raw.len() - 1] } else { raw };
    inner.to_string()
}

/// `//line `, `//extern `, `//export ` and `//name:arg` comments are tool
/// directives, not documentation. `body` is the text after `//`.
fn is_directive(body: &str) -> bool {
    if ["line ", "extern ", "export "].iter().any(|p| body.starts_with(p)) {
        return true;
    }
    let bytes = body.as_bytes();
    let Some(colon) = body.find(':') else {
        return false;
    };
    if colon == 0 || colon + 1 >= bytes.len() {
        return false;
    }
    bytes[..colon]
        .iter()
        .chain(std::iter::once(&bytes[colon + 1]))
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}
