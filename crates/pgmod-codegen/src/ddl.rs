//! Catalog DDL: `CREATE OR REPLACE FUNCTION` and `COMMENT ON FUNCTION`.

use pgmod_types::{Function, Signature};

/// `CREATE OR REPLACE FUNCTION` statement registering `function` from the
/// shared library `$libdir/<module>`.
pub fn generate_ddl(function: &Function, module: &str) -> String {
    let sig = function.signature();
    let params: Vec<String> = sig
        .params
        .iter()
        .map(|p| format!("{} {}", p.name, p.ty.sql_type()))
        .collect();
    let strict = if is_strict(function) { " STRICT" } else { "" };
    format!(
        "CREATE OR REPLACE FUNCTION {sql_name}({params})\nRETURNS {returns} AS\n'$libdir/{module}', '{name}'\nLANGUAGE c VOLATILE{strict};",
        sql_name = sig.sql_name(),
        params = params.join(","),
        returns = returns_clause(function),
        name = sig.name,
    )
}

/// `COMMENT ON FUNCTION` carrying the doc comment, if there is one.
pub fn generate_comment(function: &Function) -> Option<String> {
    let sig = function.signature();
    let doc = sig.doc.as_deref().filter(|d| !d.is_empty())?;
    Some(format!(
        "COMMENT ON FUNCTION {}({}) IS {};",
        sig.sql_name(),
        arg_types(sig).join(","),
        quote_literal(doc)
    ))
}

/// SQL argument types, which identify the routine together with its name.
pub fn arg_types(sig: &Signature) -> Vec<String> {
    sig.params.iter().map(|p| p.ty.sql_type()).collect()
}

fn returns_clause(function: &Function) -> String {
    match function {
        Function::Void(_) => "VOID".to_string(),
        Function::Scalar { returns, .. } => returns.sql_type(),
        Function::Trigger(_) => "TRIGGER".to_string(),
    }
}

/// STRICT only when no parameter accepts NULL. Triggers are never STRICT.
fn is_strict(function: &Function) -> bool {
    match function {
        Function::Trigger(_) => false,
        other => !other.signature().has_nullable_param(),
    }
}

/// Single-quoted SQL string literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
