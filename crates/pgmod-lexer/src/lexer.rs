//! Core lexer: converts Go source text to a token stream.
//!
//! Features:
//! - Full Go operator set, longest match first
//! - Interpreted, raw (multi-line) and rune literals, kept as raw text
//! - Line and block comments kept as [`TokenKind::Comment`] tokens
//! - Newlines emitted as tokens so the parser can apply Go's semicolon rule
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use pgmod_types::{CompileErrors, ErrorCode, PgmodError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// Operators and punctuation, longest first so prefixes never win.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%",
    "&", "|", "^", "<", ">", "=", "!", "~", "(", ")", "[", "]", "{", "}", ",", ".", ";", ":",
];

/// The lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`pgmod_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    text: &'src str,
    source: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based, in bytes).
    col: u32,
    /// Position of the most recently consumed byte.
    last_line: u32,
    last_col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            text: &source_file.source,
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            last_line: 1,
            last_col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        while !self.errors.is_full() {
            let token = self.scan();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        self.last_line = self.line;
        self.last_col = self.col;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(start_line, start_col, self.last_line, self.last_col)
    }

    fn text_from(&self, start: usize) -> String {
        self.text.get(start..self.pos).unwrap_or_default().to_string()
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let err = PgmodError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token.
    fn scan(&mut self) -> Token {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.advance();
        }

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;
        let Some(ch) = self.peek() else {
            return Token::new(TokenKind::Eof, self.current_span());
        };

        let kind = match ch {
            b'\n' => {
                self.advance();
                TokenKind::Newline
            }
            b'/' if self.peek_at(1) == Some(b'/') => self.scan_line_comment(start),
            b'/' if self.peek_at(1) == Some(b'*') => self.scan_block_comment(start),
            b'"' => self.scan_quoted(start, b'"', "string"),
            b'\'' => self.scan_quoted(start, b'\'', "rune"),
            b'`' => self.scan_raw_string(start),
            b'0'..=b'9' => self.scan_number(start),
            b'.' if matches!(self.peek_at(1), Some(b'0'..=b'9')) => self.scan_number(start),
            c if is_ident_start(c) => self.scan_identifier(start),
            _ => match self.scan_operator() {
                Some(kind) => kind,
                None => {
                    self.advance();
                    // swallow the rest of a multi-byte character
                    while matches!(self.peek(), Some(0x80..=0xBF)) {
                        self.advance();
                    }
                    let span = self.span_from(start_line, start_col);
                    let shown = self.text_from(start);
                    self.emit_error(
                        ErrorCode::UNEXPECTED_CHARACTER,
                        format!("unexpected character '{shown}'"),
                        span,
                    );
                    return self.scan();
                }
            },
        };

        Token::new(kind, self.span_from(start_line, start_col))
    }

    fn scan_line_comment(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch == b'\n' {
                break;
            }
            self.advance();
        }
        TokenKind::Comment(self.text_from(start).trim_end_matches('\r').to_string())
    }

    fn scan_block_comment(&mut self, start: usize) -> TokenKind {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_LITERAL,
                        "block comment not terminated",
                        span,
                    );
                    break;
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        TokenKind::Comment(self.text_from(start))
    }

    /// Interpreted strings and runes: single line, backslash escapes.
    fn scan_quoted(&mut self, start: usize, quote: u8, what: &str) -> TokenKind {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_LITERAL,
                        format!("{what} literal not terminated"),
                        span,
                    );
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    if self.peek() != Some(b'\n') {
                        self.advance();
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let text = self.text_from(start);
        if quote == b'"' {
            TokenKind::String(text)
        } else {
            TokenKind::Rune(text)
        }
    }

    fn scan_raw_string(&mut self, start: usize) -> TokenKind {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        loop {
            match self.advance() {
                Some(b'`') => break,
                Some(_) => {}
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_LITERAL,
                        "raw string literal not terminated",
                        span,
                    );
                    break;
                }
            }
        }
        TokenKind::RawString(self.text_from(start))
    }

    /// Integers, floats and imaginaries in any Go base, underscores allowed.
    fn scan_number(&mut self, start: usize) -> TokenKind {
        let hex = self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X'));
        let mut prev = 0u8;
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, b'+' | b'-')
                && if hex {
                    matches!(prev, b'p' | b'P')
                } else {
                    matches!(prev, b'e' | b'E')
                };
            let continues = c.is_ascii_alphanumeric() || c == b'_' || exponent_sign;
            let fraction = c == b'.' && self.peek_at(1) != Some(b'.');
            if !(continues || fraction) {
                break;
            }
            prev = c;
            self.advance();
        }

        let text = self.text_from(start);
        let lower = text.to_ascii_lowercase();
        if lower.ends_with('i') {
            TokenKind::Imaginary(text)
        } else if lower.contains('.')
            || (hex && lower.contains('p'))
            || (!hex && lower.contains('e'))
        {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if is_ident_start(ch) || ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        TokenKind::from_keyword(&text).unwrap_or(TokenKind::Ident(text))
    }

    fn scan_operator(&mut self) -> Option<TokenKind> {
        let rest = &self.source[self.pos..];
        let op = OPERATORS
            .iter()
            .copied()
            .find(|op| rest.starts_with(op.as_bytes()))?;
        for _ in 0..op.len() {
            self.advance();
        }
        Some(match op {
            "(" => TokenKind::LParen,
            ")" => TokenKind::RParen,
            "[" => TokenKind::LBracket,
            "]" => TokenKind::RBracket,
            "{" => TokenKind::LBrace,
            "}" => TokenKind::RBrace,
            "," => TokenKind::Comma,
            "." => TokenKind::Dot,
            "..." => TokenKind::Ellipsis,
            ";" => TokenKind::Semicolon,
            "*" => TokenKind::Star,
            "<-" => TokenKind::Arrow,
            "++" | "--" => TokenKind::IncDec(op),
            _ => TokenKind::Operator(op),
        })
    }
}

/// Letters, `_`, and any non-ASCII byte (Go allows Unicode letters in identifiers).
fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}
