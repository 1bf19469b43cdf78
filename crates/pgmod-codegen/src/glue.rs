//! cgo wrapper glue: one exported `func Name(fcinfo *funcInfo) Datum` per
//! classified function, plus the `methods.go` file that holds them all.
//!
//! Each wrapper declares a local per SQL parameter, fills them with a single
//! `fcinfo.Scan` call, forwards them to the renamed user implementation and
//! converts the result back into a `Datum`.

use std::fmt::Write;

use pgmod_types::{Function, Param, Signature, TypeTag};

/// cgo prologue of `methods.go`. `elog_error` is defined by the runtime.
pub const METHODS_PROLOGUE: &str = r#"package main

/*
#include "postgres.h"
#include "utils/elog.h"
#include "fmgr.h"
extern void elog_error(char* string);
*/
import "C"
"#;

/// Identifiers a wrapper body refers to besides its parameter locals. A
/// parameter with one of these names would shadow or redeclare it.
pub const WRAPPER_IDENTIFIERS: &[&str] = &["fcinfo", "err", "ret", "nil", "toDatum", "C"];

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Generate the wrapper for one function.
pub fn generate_glue(function: &Function) -> String {
    match function {
        Function::Void(sig) => void_glue(sig),
        Function::Scalar {
            sig,
            optional,
            ..
        } => scalar_glue(sig, *optional),
        Function::Trigger(sig) => trigger_glue(sig),
    }
}

/// Packages the wrappers must import because a parameter type is qualified
/// (`time` for `time.Time`), deduplicated in first-use order.
///
/// Results never name their type in the wrapper, so they add no import.
pub fn glue_imports(functions: &[Function]) -> Vec<&'static str> {
    let mut packages = Vec::new();
    for function in functions {
        let tags = function.params().iter().map(|p| &p.ty);
        for namespace in tags.filter_map(TypeTag::namespace) {
            if !packages.contains(&namespace) {
                packages.push(namespace);
            }
        }
    }
    packages
}

/// Assemble `methods.go`: prologue, imports, then every wrapper in order.
pub fn methods_source<'a>(
    functions: &[Function],
    glue: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut out = String::from(METHODS_PROLOGUE);
    for package in glue_imports(functions) {
        let _ = writeln!(out, "import \"{package}\"");
    }
    for block in glue {
        out.push('\n');
        out.push_str(block);
    }
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// Per-kind generators
// ══════════════════════════════════════════════════════════════════════════════

fn void_glue(sig: &Signature) -> String {
    let mut out = header(sig);
    if !sig.params.is_empty() {
        declare_params(&mut out, &sig.params);
        scan_params(&mut out, &sig.params, "");
    }
    call(&mut out, sig, "", None);
    out.push_str("\treturn toDatum(nil)\n}\n");
    out
}

fn scalar_glue(sig: &Signature, optional: bool) -> String {
    let mut out = header(sig);
    if !sig.params.is_empty() {
        declare_params(&mut out, &sig.params);
        scan_params(&mut out, &sig.params, "err := ");
        out.push_str("\tif err != nil {\n");
        out.push_str("\t\tC.elog_error(C.CString(err.Error()))\n");
        out.push_str("\t}\n");
    }
    call(&mut out, sig, "ret := ", None);
    if optional {
        out.push_str("\tif ret == nil {\n");
        out.push_str("\t\tfcinfo.isnull = C.char(1)\n");
        out.push_str("\t\treturn toDatum(nil)\n");
        out.push_str("\t}\n");
        out.push_str("\treturn toDatum(*ret)\n}\n");
    } else {
        out.push_str("\treturn toDatum(ret)\n}\n");
    }
    out
}

fn trigger_glue(sig: &Signature) -> String {
    let mut out = header(sig);
    if !sig.params.is_empty() {
        declare_params(&mut out, &sig.params);
        scan_params(&mut out, &sig.params, "");
    }
    call(&mut out, sig, "ret := ", Some("fcinfo.TriggerData()"));
    out.push_str("\treturn toDatum(ret)\n}\n");
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// Shared helpers
// ══════════════════════════════════════════════════════════════════════════════

fn header(sig: &Signature) -> String {
    format!(
        "//export {name}\nfunc {name}(fcinfo *funcInfo) Datum {{\n",
        name = sig.name
    )
}

/// `var p T` per parameter; nullable parameters still get a value local.
fn declare_params(out: &mut String, params: &[Param]) {
    for p in params {
        let _ = writeln!(out, "\tvar {} {}", p.name, p.ty.host_type());
    }
}

fn scan_params(out: &mut String, params: &[Param], capture: &str) {
    let _ = writeln!(out, "\t{capture}fcinfo.Scan(");
    for p in params {
        let _ = writeln!(out, "\t\t&{},", p.name);
    }
    out.push_str("\t)\n");
}

/// Call the internal implementation; nullable locals are passed by address.
fn call(out: &mut String, sig: &Signature, capture: &str, leading: Option<&str>) {
    let internal = sig.internal_name();
    let args: Vec<String> = leading
        .map(str::to_string)
        .into_iter()
        .chain(sig.params.iter().map(|p| {
            if p.nullable {
                format!("&{}", p.name)
            } else {
                p.name.clone()
            }
        }))
        .collect();

    if args.is_empty() {
        let _ = writeln!(out, "\t{capture}{internal}()");
        return;
    }
    let _ = writeln!(out, "\t{capture}{internal}(");
    for arg in args {
        let _ = writeln!(out, "\t\t{arg},");
    }
    out.push_str("\t)\n");
}
