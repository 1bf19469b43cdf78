//! pgmod parser: converts a Go token stream into a declaration-level AST.
//!
//! Function bodies and `type`/`var`/`const` declarations are not parsed
//! further than their extent; the rewriter works on their tokens directly.

mod parse_decl;
mod parse_type;
mod parser;

pub use parser::{ParseResult, Parser};

use pgmod_lexer::Lexer;
use pgmod_types::SourceFile;

/// Lex and parse one file, merging lexer and parser diagnostics.
pub fn parse_source(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    result.errors = errors;
    result
}
