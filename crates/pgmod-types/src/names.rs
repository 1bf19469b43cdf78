//! Names derived from an exported Go identifier.

use std::sync::LazyLock;

use regex::Regex;

static FIRST_CAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(.)([A-Z][a-z]+)").expect("valid regex"));
static ALL_CAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("([a-z0-9])([A-Z])").expect("valid regex"));

/// Go's predeclared identifiers. An internal name must not take one over.
pub const PREDECLARED: &[&str] = &[
    // types
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
    // constants and zero value
    "true", "false", "iota", "nil",
    // functions
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make",
    "max", "min", "new", "panic", "print", "println", "real", "recover",
];

/// The name the user's implementation is renamed to, so the generated
/// export can take over the original symbol: `ConcatAll` → `concatAll`.
pub fn internal_name(exported: &str) -> String {
    let mut chars = exported.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The SQL-visible routine name: `ConcatAll` → `concat_all`.
///
/// Runs of capitals (acronyms) come out however the two boundary passes
/// split them; `HTTPServer` becomes `http_server`, `GetHTTP` becomes `get_http`.
pub fn sql_name(exported: &str) -> String {
    let snake = FIRST_CAP.replace_all(exported, "${1}_${2}");
    let snake = ALL_CAP.replace_all(&snake, "${1}_${2}");
    snake.to_lowercase()
}
