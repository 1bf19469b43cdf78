//! Core parser infrastructure: token cursor, error reporting, helpers.

use pgmod_lexer::{Token, TokenKind};
use pgmod_types::ast::{Ident, SourceUnit};
use pgmod_types::{CompileErrors, ErrorCode, PgmodError, SourceFile, Span};

/// The pgmod parser.
///
/// Consumes a token stream produced by the lexer and builds a
/// declaration-level AST. Collects errors and attempts recovery when possible.
pub struct Parser<'src> {
    /// Significant tokens (comments removed).
    tokens: Vec<Token>,
    /// Comment tokens, in source order, for doc extraction.
    pub(crate) comments: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    pub(crate) source_file: &'src SourceFile,
    /// Collected errors.
    errors: CompileErrors,
}

/// Result of parsing.
pub struct ParseResult {
    pub unit: Option<SourceUnit>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        let (comments, mut tokens): (Vec<Token>, Vec<Token>) =
            tokens.into_iter().partition(Token::is_trivia);
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = Span::point(source_file.line_count() as u32, 1);
            tokens.push(Token::new(TokenKind::Eof, end));
        }
        Self {
            tokens,
            comments,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
        }
    }

    /// Parse the whole file.
    pub fn parse(mut self) -> ParseResult {
        let unit = self.parse_source_unit();
        ParseResult {
            unit,
            errors: self.errors,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Index of the current token, for progress checks.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Returns the previously consumed token, if any.
    pub(crate) fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        self.previous().map_or(Span::point(1, 1), |t| t.span)
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    // ── Separators ────────────────────────────────────────────────────────────

    /// Skip newlines and explicit semicolons.
    pub(crate) fn skip_separators(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Skip newlines only (inside bracketed lists).
    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Expect the end of a top-level statement: newline, `;` or end of file.
    pub(crate) fn expect_statement_end(&mut self) {
        match self.peek_kind() {
            TokenKind::Eof => {}
            TokenKind::Newline | TokenKind::Semicolon => self.skip_separators(),
            other => {
                let message = format!("expected newline or ';', got '{other}'");
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, message);
                self.synchronize();
            }
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Consume a balanced bracket group starting at the current opener.
    ///
    /// Returns the span from the opener to its closer, or reports
    /// `UNCLOSED_BRACE` at the opener when the file ends first.
    pub(crate) fn skip_balanced(&mut self) -> Option<Span> {
        let open = self.advance();
        let mut depth = open.kind.depth_delta();
        while depth > 0 {
            if self.at_end() {
                self.error_at(
                    ErrorCode::UNCLOSED_BRACE,
                    format!("'{}' is never closed", open.kind),
                    open.span,
                );
                return None;
            }
            depth += self.advance().kind.depth_delta();
        }
        Some(open.span.merge(self.previous_span()))
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let error = PgmodError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until the next top-level declaration keyword that starts a line.
    pub(crate) fn synchronize(&mut self) {
        let mut depth = 0i32;
        while !self.at_end() {
            let line_start = self
                .previous()
                .is_none_or(|t| matches!(t.kind, TokenKind::Newline | TokenKind::Semicolon));
            let decl_start = matches!(
                self.peek_kind(),
                TokenKind::Func
                    | TokenKind::Type
                    | TokenKind::Var
                    | TokenKind::Const
                    | TokenKind::Import
            );
            if depth <= 0 && line_start && decl_start {
                return;
            }
            depth += self.advance().kind.depth_delta();
        }
    }
}
