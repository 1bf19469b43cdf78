//! AST node types for the declaration-level Go subset pgmod understands.
//!
//! Only what classification and rewriting need is modelled: the package
//! clause, imports, function signatures with their doc comments, and the
//! extent of everything else. Function bodies stay as token ranges.

use std::fmt;

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// One parsed `.go` file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    /// `package <name>`
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
    pub span: Span,
}

impl SourceUnit {
    /// Iterate over the function declarations, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            Decl::Other(_) => None,
        })
    }
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Go's export rule: the name starts with an upper-case letter.
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

/// `import alias "path"`, one spec, whether grouped or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// Explicit package name (`pg "github.com/..."`, `_`, `.`).
    pub alias: Option<Ident>,
    /// Unquoted import path.
    pub path: String,
    pub span: Span,
}

impl ImportSpec {
    /// The identifier this import binds in the file: the alias, or the
    /// last path element.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => &alias.name,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A top-level declaration after the imports.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(FuncDecl),
    Other(OtherDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Func(f) => f.span,
            Decl::Other(o) => o.span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// `func [(recv)] Name(params) results { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Ident,
    /// Receiver list for methods; `None` for plain functions.
    pub receiver: Option<Vec<Field>>,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    /// Text of the doc comment directly above the declaration.
    pub doc: Option<String>,
    /// Span of the body including its braces; `None` for external functions.
    pub body: Option<Span>,
    pub span: Span,
}

impl FuncDecl {
    /// An exported plain function (methods never are).
    pub fn is_exported_function(&self) -> bool {
        self.receiver.is_none() && self.name.is_exported()
    }

    /// Number of result values, counting each name in a group.
    pub fn result_count(&self) -> usize {
        self.results.iter().map(Field::arity).sum()
    }
}

/// One entry of a parameter or result list: `a, b string` or `string`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Empty for unnamed entries.
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub span: Span,
}

impl Field {
    /// How many values this entry declares.
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Other declarations
// ══════════════════════════════════════════════════════════════════════════════

/// Which keyword introduced an [`OtherDecl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Type,
    Var,
    Const,
}

impl fmt::Display for DeclKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKeyword::Type => f.write_str("type"),
            DeclKeyword::Var => f.write_str("var"),
            DeclKeyword::Const => f.write_str("const"),
        }
    }
}

/// A `type`, `var` or `const` declaration, kept opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherDecl {
    pub keyword: DeclKeyword,
    /// Names declared at the start of each spec, best effort.
    pub names: Vec<Ident>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Type expressions
// ══════════════════════════════════════════════════════════════════════════════

/// A syntactic Go type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeKind,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `string`, `MyType`
    Named(String),
    /// `time.Time`
    Qualified { package: String, name: String },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T`; the length is kept as written.
    Array { len: String, elem: Box<TypeExpr> },
    /// `map[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `...T` (variadic parameter)
    Variadic(Box<TypeExpr>),
    /// `chan T`, `<-chan T`, `chan<- T`
    Chan(Box<TypeExpr>),
    /// `func(...) ...`: signature text kept verbatim.
    Func(String),
    /// `struct { ... }`
    Struct,
    /// `interface { ... }`
    Interface,
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Named(name) => f.write_str(name),
            TypeKind::Qualified { package, name } => write!(f, "{package}.{name}"),
            TypeKind::Pointer(inner) => write!(f, "*{inner}"),
            TypeKind::Slice(elem) => write!(f, "[]{elem}"),
            TypeKind::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeKind::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeKind::Variadic(elem) => write!(f, "...{elem}"),
            TypeKind::Chan(elem) => write!(f, "chan {elem}"),
            TypeKind::Func(sig) => f.write_str(sig),
            TypeKind::Struct => f.write_str("struct{...}"),
            TypeKind::Interface => f.write_str("interface{...}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(kind: TypeKind) -> TypeExpr {
        TypeExpr::new(kind, Span::point(1, 1))
    }

    #[test]
    fn test_type_display_round_trips_go_spelling() {
        let map = ty(TypeKind::Map {
            key: Box::new(ty(TypeKind::Named("string".into()))),
            value: Box::new(ty(TypeKind::Slice(Box::new(ty(TypeKind::Qualified {
                package: "time".into(),
                name: "Time".into(),
            }))))),
        });
        assert_eq!(map.to_string(), "map[string][]time.Time");

        let ptr = ty(TypeKind::Pointer(Box::new(ty(TypeKind::Qualified {
            package: "plgo".into(),
            name: "TriggerData".into(),
        }))));
        assert_eq!(ptr.to_string(), "*plgo.TriggerData");
    }

    #[test]
    fn test_import_local_name() {
        let plain = ImportSpec {
            alias: None,
            path: "github.com/paulhatch/plgo".into(),
            span: Span::point(1, 1),
        };
        assert_eq!(plain.local_name(), "plgo");

        let aliased = ImportSpec {
            alias: Some(Ident::new("pg", Span::point(1, 1))),
            ..plain
        };
        assert_eq!(aliased.local_name(), "pg");
    }

    #[test]
    fn test_exported_rule() {
        assert!(Ident::new("ConcatAll", Span::point(1, 1)).is_exported());
        assert!(!Ident::new("concatAll", Span::point(1, 1)).is_exported());
        assert!(!Ident::new("_Hidden", Span::point(1, 1)).is_exported());
    }
}
