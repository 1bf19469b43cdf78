//! Type and parameter list parsing.

use pgmod_lexer::TokenKind;
use pgmod_types::ast::*;
use pgmod_types::{ErrorCode, Span};

use crate::parser::Parser;

/// One comma-separated entry of a parameter list before grouping.
///
/// A bare identifier is a name or a type depending on its neighbours,
/// which is only known once the whole list has been read.
enum ParamEntry {
    Bare(Ident),
    Named(Ident, TypeExpr),
    Type(TypeExpr),
}

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Parameters
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse `( [ParameterList [,]] )` and apply Go's grouping rule:
    /// if any entry carries a name, every bare identifier is a name sharing
    /// the next entry's type; otherwise every entry is a type.
    pub(crate) fn parse_parameters(&mut self) -> Option<Vec<Field>> {
        self.expect(&TokenKind::LParen)?;
        let mut entries = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(&TokenKind::RParen) {
                break;
            }
            entries.push(self.parse_param_entry()?);
            self.skip_newlines();
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.skip_newlines();
        self.expect(&TokenKind::RParen)?;
        self.group_params(entries)
    }

    fn parse_param_entry(&mut self) -> Option<ParamEntry> {
        let TokenKind::Ident(name) = self.peek_kind().clone() else {
            return self.parse_type().map(ParamEntry::Type);
        };
        match self.look_ahead(1) {
            TokenKind::Dot => self.parse_type().map(ParamEntry::Type),
            TokenKind::Comma | TokenKind::RParen | TokenKind::Newline => {
                let span = self.advance().span;
                Some(ParamEntry::Bare(Ident::new(name, span)))
            }
            _ => {
                let span = self.advance().span;
                let ty = self.parse_type()?;
                Some(ParamEntry::Named(Ident::new(name, span), ty))
            }
        }
    }

    fn group_params(&mut self, entries: Vec<ParamEntry>) -> Option<Vec<Field>> {
        let any_named = entries.iter().any(|e| matches!(e, ParamEntry::Named(..)));
        if !any_named {
            let fields = entries
                .into_iter()
                .map(|entry| {
                    let ty = match entry {
                        ParamEntry::Bare(id) => TypeExpr::new(TypeKind::Named(id.name), id.span),
                        ParamEntry::Type(ty) | ParamEntry::Named(_, ty) => ty,
                    };
                    Field {
                        names: Vec::new(),
                        span: ty.span,
                        ty,
                    }
                })
                .collect();
            return Some(fields);
        }

        let mut fields = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        for entry in entries {
            match entry {
                ParamEntry::Bare(id) => pending.push(id),
                ParamEntry::Named(id, ty) => {
                    pending.push(id);
                    let span = pending[0].span.merge(ty.span);
                    fields.push(Field {
                        names: std::mem::take(&mut pending),
                        ty,
                        span,
                    });
                }
                ParamEntry::Type(ty) => {
                    self.mixed_params(ty.span);
                    return None;
                }
            }
        }
        if let Some(first) = pending.first() {
            self.mixed_params(first.span);
            return None;
        }
        Some(fields)
    }

    fn mixed_params(&mut self, span: Span) {
        self.error_at(
            ErrorCode::UNEXPECTED_TOKEN,
            "mixed named and unnamed parameters",
            span,
        );
    }

    /// Parse an optional result: a parenthesised list, a single type, or nothing.
    pub(crate) fn parse_results(&mut self) -> Option<Vec<Field>> {
        if self.check(&TokenKind::LParen) {
            return self.parse_parameters();
        }
        if !starts_type(self.peek_kind()) {
            return Some(Vec::new());
        }
        let ty = self.parse_type()?;
        Some(vec![Field {
            names: Vec::new(),
            span: ty.span,
            ty,
        }])
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Types
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a type.
    ///
    /// ```ebnf
    /// Type = TypeName [ TypeArgs ] | "*" Type | "[" [ Len ] "]" Type
    ///      | "map" "[" Type "]" Type | [ "<-" ] "chan" [ "<-" ] Type
    ///      | "..." Type | "func" Parameters [ Result ]
    ///      | "struct" "{" ... "}" | "interface" "{" ... "}" | "(" Type ")" ;
    /// ```
    pub(crate) fn parse_type(&mut self) -> Option<TypeExpr> {
        let start = self.current_span();
        let kind = match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                let kind = if self.check(&TokenKind::Dot)
                    && matches!(self.look_ahead(1), TokenKind::Ident(_))
                {
                    self.advance();
                    let member = self.expect_identifier()?;
                    TypeKind::Qualified {
                        package: name,
                        name: member.name,
                    }
                } else {
                    TypeKind::Named(name)
                };
                if self.check(&TokenKind::LBracket) {
                    // generic instantiation, not modelled
                    self.skip_balanced()?;
                }
                kind
            }
            TokenKind::Star => {
                self.advance();
                TypeKind::Pointer(Box::new(self.parse_type()?))
            }
            TokenKind::LBracket => {
                self.advance();
                if self.eat(&TokenKind::RBracket) {
                    TypeKind::Slice(Box::new(self.parse_type()?))
                } else {
                    let mut len = String::new();
                    while !self.check(&TokenKind::RBracket) && !self.at_end() {
                        len.push_str(&self.advance().kind.to_string());
                    }
                    self.expect(&TokenKind::RBracket)?;
                    TypeKind::Array {
                        len,
                        elem: Box::new(self.parse_type()?),
                    }
                }
            }
            TokenKind::Map => {
                self.advance();
                self.expect(&TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(&TokenKind::RBracket)?;
                let value = self.parse_type()?;
                TypeKind::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            TokenKind::Chan => {
                self.advance();
                self.eat(&TokenKind::Arrow);
                TypeKind::Chan(Box::new(self.parse_type()?))
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(&TokenKind::Chan)?;
                TypeKind::Chan(Box::new(self.parse_type()?))
            }
            TokenKind::Ellipsis => {
                self.advance();
                TypeKind::Variadic(Box::new(self.parse_type()?))
            }
            TokenKind::Func => {
                self.advance();
                self.parse_parameters()?;
                self.parse_results()?;
                let span = start.merge(self.previous_span());
                TypeKind::Func(self.source_file.slice(span).to_string())
            }
            TokenKind::Struct | TokenKind::Interface => {
                let is_struct = self.advance().kind == TokenKind::Struct;
                if !self.check(&TokenKind::LBrace) {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("expected '{{', got '{}'", self.peek_kind()),
                    );
                    return None;
                }
                self.skip_balanced()?;
                if is_struct {
                    TypeKind::Struct
                } else {
                    TypeKind::Interface
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(&TokenKind::RParen)?;
                inner.kind
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected type, got '{other}'"),
                );
                return None;
            }
        };
        Some(TypeExpr::new(kind, start.merge(self.previous_span())))
    }
}

/// Tokens that can begin a type in result position.
fn starts_type(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Star
            | TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Arrow
            | TokenKind::Func
            | TokenKind::Struct
            | TokenKind::Interface
    )
}
