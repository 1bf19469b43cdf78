//! Token types for the pgmod lexer.
//!
//! Go has 25 keywords; the ones that shape declarations get their own
//! [`TokenKind`] variant, the rest are kept as [`TokenKind::Keyword`] so the
//! parser and the semicolon-insertion rule can still recognise them.

use pgmod_types::Span;
use std::fmt;

/// All 25 Go keywords.
pub const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
    "package", "range", "return", "select", "struct", "switch", "type", "var",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Comments are kept in the stream for doc extraction but are otherwise trivia.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }

    /// The identifier text, if this is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals (raw source text kept) ──────────────────────
    Ident(String),
    Int(String),
    Float(String),
    Imaginary(String),
    Rune(String),
    /// Interpreted string, with its quotes.
    String(String),
    /// Backquoted string, with its backquotes.
    RawString(String),

    // ── Declaration keywords ─────────────────────────────────
    Package,
    Import,
    Func,
    Type,
    Var,
    Const,
    Struct,
    Interface,
    Map,
    Chan,
    /// Any other Go keyword.
    Keyword(&'static str),

    // ── Punctuation ──────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Ellipsis,
    Semicolon,
    Star,
    /// `<-`
    Arrow,
    /// `++` / `--` (they trigger semicolon insertion)
    IncDec(&'static str),
    /// Every other operator.
    Operator(&'static str),

    // ── Trivia & special ─────────────────────────────────────
    /// `// text` or `/* text */`, markers included.
    Comment(String),
    Newline,
    Eof,
}

impl TokenKind {
    /// Map a word to its keyword token, or `None` for identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "package" => TokenKind::Package,
            "import" => TokenKind::Import,
            "func" => TokenKind::Func,
            "type" => TokenKind::Type,
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "struct" => TokenKind::Struct,
            "interface" => TokenKind::Interface,
            "map" => TokenKind::Map,
            "chan" => TokenKind::Chan,
            other => TokenKind::Keyword(KEYWORDS.iter().copied().find(|k| *k == other)?),
        })
    }

    /// Go's automatic semicolon rule: a newline after one of these ends the statement.
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Imaginary(_)
                | TokenKind::Rune(_)
                | TokenKind::String(_)
                | TokenKind::RawString(_)
                | TokenKind::Keyword("break" | "continue" | "fallthrough" | "return")
                | TokenKind::IncDec(_)
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// Bracket nesting change when this token is consumed.
    pub fn depth_delta(&self) -> i32 {
        match self {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => -1,
            _ => 0,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s)
            | TokenKind::Int(s)
            | TokenKind::Float(s)
            | TokenKind::Imaginary(s)
            | TokenKind::Rune(s)
            | TokenKind::String(s)
            | TokenKind::RawString(s) => f.write_str(s),
            TokenKind::Package => f.write_str("package"),
            TokenKind::Import => f.write_str("import"),
            TokenKind::Func => f.write_str("func"),
            TokenKind::Type => f.write_str("type"),
            TokenKind::Var => f.write_str("var"),
            TokenKind::Const => f.write_str("const"),
            TokenKind::Struct => f.write_str("struct"),
            TokenKind::Interface => f.write_str("interface"),
            TokenKind::Map => f.write_str("map"),
            TokenKind::Chan => f.write_str("chan"),
            TokenKind::Keyword(k) => f.write_str(k),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Ellipsis => f.write_str("..."),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Arrow => f.write_str("<-"),
            TokenKind::IncDec(op) | TokenKind::Operator(op) => f.write_str(op),
            TokenKind::Comment(_) => f.write_str("comment"),
            TokenKind::Newline => f.write_str("newline"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_is_recognised() {
        assert_eq!(KEYWORDS.len(), 25);
        for kw in KEYWORDS {
            let kind = TokenKind::from_keyword(kw)
                .unwrap_or_else(|| panic!("{kw} should be a keyword"));
            assert_eq!(kind.to_string(), *kw);
        }
    }

    #[test]
    fn test_identifiers_are_not_keywords() {
        for word in ["plgo", "string", "int", "nil", "true", "TriggerData", "Package"] {
            assert_eq!(TokenKind::from_keyword(word), None, "{word}");
        }
    }

    #[test]
    fn test_semicolon_insertion_triggers() {
        assert!(TokenKind::Ident("x".into()).ends_statement());
        assert!(TokenKind::RBrace.ends_statement());
        assert!(TokenKind::Keyword("return").ends_statement());
        assert!(!TokenKind::Keyword("if").ends_statement());
        assert!(!TokenKind::Comma.ends_statement());
        assert!(!TokenKind::LBrace.ends_statement());
        assert!(!TokenKind::Operator("+").ends_statement());
    }
}
