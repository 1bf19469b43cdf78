//! Declaration classification: decide the calling shape of every exported
//! function and map its parameter and result types through the datum table.

use std::collections::HashMap;

use pgmod_codegen::glue::WRAPPER_IDENTIFIERS;
use pgmod_lexer::KEYWORDS;
use pgmod_types::ast::{Decl, Field, FuncDecl, TypeExpr, TypeKind};
use pgmod_types::names::{internal_name, PREDECLARED};
use pgmod_types::{
    CompileErrors, Datum, ErrorCode, Function, Param, Signature, TypeTag,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CompileResult;
use crate::module::{file_error, ModuleSource, ParsedFile};

const TRIGGER_DATA: &str = "TriggerData";
const TRIGGER_ROW: &str = "TriggerRow";

/// Functions with a fixed meaning in `package main`.
const PACKAGE_MAIN_FUNCS: &[&str] = &["main", "init"];

/// The classified form of a module, threaded through the rest of the compile.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedModule {
    pub name: String,
    /// Exported functions in file order, then declaration order.
    pub functions: Vec<Function>,
    /// Import path of the facade package.
    pub facade_path: String,
    /// Non-fatal findings, such as skipped exported methods.
    #[serde(skip)]
    pub warnings: CompileErrors,
}

/// Classify every exported function of `module`.
///
/// All diagnostics are collected before failing, so one run reports every
/// unsupported declaration at once.
pub fn classify(module: &ModuleSource, facade_path: &str) -> CompileResult<ClassifiedModule> {
    let mut diagnostics = CompileErrors::empty();
    let mut functions = Vec::new();

    for file in &module.files {
        let facade = file.facade_ident(facade_path);
        for func in file.unit.functions() {
            if !func.name.is_exported() {
                continue;
            }
            if func.receiver.is_some() {
                warn!(file = %file.source.name, method = %func.name.name, "skipping exported method");
                diagnostics.push_warning(file_error(
                    file,
                    ErrorCode::EXPORTED_METHOD,
                    format!("exported method {} is not registered as a routine", func.name.name),
                    func.name.span,
                ));
                continue;
            }

            let mut classifier = FunctionClassifier {
                file,
                func,
                facade: &facade,
                errors: &mut diagnostics,
            };
            if let Some(function) = classifier.classify() {
                debug!(
                    function = %function.name(),
                    kind = ?function.kind(),
                    params = function.params().len(),
                    "classified"
                );
                functions.push(function);
            }
        }
    }

    check_internal_names(module, &functions, &mut diagnostics);

    if diagnostics.has_errors() {
        return Err(diagnostics.into());
    }
    Ok(ClassifiedModule {
        name: module.name.clone(),
        functions,
        facade_path: facade_path.to_string(),
        warnings: diagnostics,
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// Per-function classification
// ══════════════════════════════════════════════════════════════════════════════

struct FunctionClassifier<'a> {
    file: &'a ParsedFile,
    func: &'a FuncDecl,
    facade: &'a str,
    errors: &'a mut CompileErrors,
}

impl FunctionClassifier<'_> {
    fn classify(&mut self) -> Option<Function> {
        let before = self.errors.total_errors;
        self.check_reserved_internal_name();
        let (params, has_context) = self.params();
        let result = self.result(has_context);
        if self.errors.total_errors > before {
            return None;
        }

        let mut sig = Signature::new(&self.func.name.name, params);
        if let Some(doc) = self.func.doc.as_deref().filter(|d| !d.is_empty()) {
            sig = sig.with_doc(doc);
        }
        Some(match result? {
            Shape::Void => Function::Void(sig),
            Shape::Scalar { returns, optional } => Function::Scalar {
                sig,
                returns,
                optional,
            },
            Shape::Trigger => Function::Trigger(sig),
        })
    }

    /// SQL parameters, and whether a trigger context leads the list.
    fn params(&mut self) -> (Vec<Param>, bool) {
        let func = self.func;
        let mut params = Vec::new();
        let mut has_context = false;
        let mut position = 0;

        for field in &func.params {
            if self.is_trigger_data(&field.ty) {
                if position != 0 {
                    self.error(
                        ErrorCode::TRIGGER_DATA_NOT_FIRST,
                        format!(
                            "{}: trigger data must be the first parameter, found at position {}",
                            func.name.name,
                            position + 1
                        ),
                        field,
                    );
                } else if field.names.len() > 1 {
                    self.error(
                        ErrorCode::TRIGGER_DATA_GROUPED,
                        format!(
                            "{}: trigger data must be a single parameter",
                            func.name.name
                        ),
                        field,
                    );
                } else {
                    has_context = true;
                }
                position += field.arity();
                continue;
            }

            let resolved = resolve_param(&field.ty);
            if resolved.is_none() {
                let param = field
                    .names
                    .first()
                    .map(|n| n.name.as_str())
                    .unwrap_or("_");
                let message = format!(
                    "{}: parameter {param} has unsupported type {}",
                    func.name.name, field.ty
                );
                self.errors.push_error(
                    file_error(self.file, ErrorCode::UNSUPPORTED_PARAM_TYPE, message, field.ty.span)
                        .with_suggestion(supported_types_hint()),
                );
            }

            if field.names.is_empty() {
                self.error(
                    ErrorCode::UNNAMED_PARAMETER,
                    format!(
                        "{}: parameter {} has no name",
                        func.name.name,
                        position + 1
                    ),
                    field,
                );
            }
            for name in &field.names {
                if name.name == "_" {
                    self.error(
                        ErrorCode::UNNAMED_PARAMETER,
                        format!(
                            "{}: parameter {} is named `_`",
                            func.name.name,
                            position + 1
                        ),
                        field,
                    );
                } else if self.is_wrapper_reserved(&name.name) {
                    self.error(
                        ErrorCode::RESERVED_PARAMETER_NAME,
                        format!(
                            "{}: parameter name {} is used by the generated wrapper",
                            func.name.name, name.name
                        ),
                        field,
                    );
                } else if let Some((ty, nullable)) = resolved {
                    params.push(Param {
                        name: name.name.clone(),
                        ty,
                        nullable,
                    });
                }
            }
            position += field.arity();
        }

        (params, has_context)
    }

    fn result(&mut self, has_context: bool) -> Option<Shape> {
        let func = self.func;
        let name = &func.name;
        match func.results.as_slice() {
            [] if has_context => {
                self.errors.push_error(file_error(
                    self.file,
                    ErrorCode::TRIGGER_DATA_WITHOUT_ROW,
                    format!(
                        "{}: a function taking trigger data must return *{}.{TRIGGER_ROW}",
                        name.name, self.facade
                    ),
                    name.span,
                ));
                None
            }
            [] => Some(Shape::Void),
            [field] if field.arity() == 1 => self.single_result(&field.ty, has_context),
            _ => {
                self.errors.push_error(file_error(
                    self.file,
                    ErrorCode::MULTIPLE_RETURN_VALUES,
                    format!(
                        "{}: returns {} values, at most one is supported",
                        name.name,
                        func.result_count()
                    ),
                    name.span,
                ));
                None
            }
        }
    }

    fn single_result(&mut self, ty: &TypeExpr, has_context: bool) -> Option<Shape> {
        let name = &self.func.name.name;
        if self.is_facade_pointer(ty, TRIGGER_ROW) {
            if has_context {
                return Some(Shape::Trigger);
            }
            self.errors.push_error(file_error(
                self.file,
                ErrorCode::TRIGGER_ROW_WITHOUT_DATA,
                format!(
                    "{name}: returning {ty} requires *{}.{TRIGGER_DATA} as the first parameter",
                    self.facade
                ),
                ty.span,
            ));
            return None;
        }

        let shape = match &ty.kind {
            TypeKind::Pointer(inner) => resolve_scalar(inner)
                .filter(|tag| !tag.array)
                .map(|returns| Shape::Scalar {
                    returns,
                    optional: true,
                }),
            _ => resolve_scalar(ty).map(|returns| Shape::Scalar {
                returns,
                optional: false,
            }),
        };
        if shape.is_none() {
            self.errors.push_error(
                file_error(
                    self.file,
                    ErrorCode::UNSUPPORTED_RETURN_TYPE,
                    format!("{name}: unsupported return type {ty}"),
                    ty.span,
                )
                .with_suggestion(supported_types_hint()),
            );
            return None;
        }
        if has_context {
            self.errors.push_error(file_error(
                self.file,
                ErrorCode::TRIGGER_DATA_WITHOUT_ROW,
                format!(
                    "{name}: a function taking trigger data must return *{}.{TRIGGER_ROW}",
                    self.facade
                ),
                ty.span,
            ));
            return None;
        }
        shape
    }

    /// The lowered name must stay an ordinary package-level identifier.
    fn check_reserved_internal_name(&mut self) {
        let name = &self.func.name;
        let internal = internal_name(&name.name);
        let what = if KEYWORDS.contains(&internal.as_str()) {
            "a Go keyword"
        } else if PREDECLARED.contains(&internal.as_str()) {
            "a predeclared Go identifier"
        } else if PACKAGE_MAIN_FUNCS.contains(&internal.as_str()) {
            "a special function of package main"
        } else {
            return;
        };
        self.errors.push_error(
            file_error(
                self.file,
                ErrorCode::INTERNAL_NAME_COLLISION,
                format!("{} is renamed to {internal}, which is {what}", name.name),
                name.span,
            )
            .with_suggestion(format!("choose another name than {}", name.name)),
        );
    }

    /// Names the wrapper of this function already uses, its call target included.
    fn is_wrapper_reserved(&self, param: &str) -> bool {
        WRAPPER_IDENTIFIERS.contains(&param) || internal_name(&self.func.name.name) == param
    }

    fn is_trigger_data(&self, ty: &TypeExpr) -> bool {
        self.is_facade_pointer(ty, TRIGGER_DATA)
    }

    /// `*<facade>.<name>`
    fn is_facade_pointer(&self, ty: &TypeExpr, name: &str) -> bool {
        match &ty.kind {
            TypeKind::Pointer(inner) => matches!(
                &inner.kind,
                TypeKind::Qualified { package, name: n } if package == self.facade && n == name
            ),
            _ => false,
        }
    }

    fn error(&mut self, code: ErrorCode, message: String, field: &Field) {
        self.errors
            .push_error(file_error(self.file, code, message, field.span));
    }
}

enum Shape {
    Void,
    Scalar { returns: TypeTag, optional: bool },
    Trigger,
}

/// Type tag of a parameter, and whether it is nullable (`*T`).
fn resolve_param(ty: &TypeExpr) -> Option<(TypeTag, bool)> {
    match &ty.kind {
        TypeKind::Pointer(inner) => resolve_scalar(inner)
            .filter(|tag| !tag.array)
            .map(|tag| (tag, true)),
        _ => resolve_scalar(ty).map(|tag| (tag, false)),
    }
}

/// Exact table lookup of a non-pointer type. The opaque row type only ever
/// appears as a trigger result.
fn resolve_scalar(ty: &TypeExpr) -> Option<TypeTag> {
    let spelling = match &ty.kind {
        TypeKind::Named(_) | TypeKind::Qualified { .. } | TypeKind::Slice(_) => ty.to_string(),
        _ => return None,
    };
    TypeTag::lookup(&spelling).filter(|tag| !tag.is_trigger_row())
}

fn supported_types_hint() -> String {
    let names: Vec<&str> = Datum::ALL
        .iter()
        .filter(|d| **d != Datum::TriggerRow)
        .map(|d| d.go_type())
        .collect();
    format!("supported types are {}, their slices and pointers", names.join(", "))
}

// ══════════════════════════════════════════════════════════════════════════════
// Module-level checks
// ══════════════════════════════════════════════════════════════════════════════

/// Renaming `Foo` to `foo` must not shadow or redeclare another top-level name.
fn check_internal_names(module: &ModuleSource, functions: &[Function], errors: &mut CompileErrors) {
    let mut declared: HashMap<&str, (&ParsedFile, pgmod_types::Span)> = HashMap::new();
    for file in &module.files {
        for decl in &file.unit.decls {
            match decl {
                Decl::Func(f) if f.receiver.is_none() => {
                    declared.entry(f.name.name.as_str()).or_insert((file, f.name.span));
                }
                Decl::Func(_) => {}
                Decl::Other(other) => {
                    for name in &other.names {
                        declared.entry(name.name.as_str()).or_insert((file, name.span));
                    }
                }
            }
        }
    }

    for function in functions {
        let internal = function.signature().internal_name();
        if let Some((file, span)) = declared.get(internal.as_str()) {
            errors.push_error(
                file_error(
                    file,
                    ErrorCode::INTERNAL_NAME_COLLISION,
                    format!(
                        "{} is renamed to {internal}, which is already declared",
                        function.name()
                    ),
                    *span,
                )
                .with_suggestion(format!("rename the existing {internal}")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgmod_types::{SourceFile, Span};

    fn ty(kind: TypeKind) -> TypeExpr {
        TypeExpr::new(kind, Span::point(1, 1))
    }

    fn named(name: &str) -> TypeExpr {
        ty(TypeKind::Named(name.to_string()))
    }

    #[test]
    fn test_resolve_param_pointer_is_nullable() {
        let ptr = ty(TypeKind::Pointer(Box::new(named("int64"))));
        assert_eq!(resolve_param(&ptr), Some((TypeTag::scalar(Datum::Int64), true)));
    }

    #[test]
    fn test_resolve_param_rejects_pointer_to_slice() {
        let ptr = ty(TypeKind::Pointer(Box::new(ty(TypeKind::Slice(Box::new(named(
            "string",
        )))))));
        assert_eq!(resolve_param(&ptr), None);
    }

    #[test]
    fn test_resolve_scalar_rejects_bare_trigger_row() {
        assert_eq!(resolve_scalar(&named("TriggerRow")), None);
    }

    #[test]
    fn test_hint_lists_table_types() {
        let hint = supported_types_hint();
        assert!(hint.contains("time.Time"));
        assert!(!hint.contains("TriggerRow"));
    }

    #[test]
    fn test_module_name_carried() {
        let module = ModuleSource::from_sources(
            "demo",
            vec![SourceFile::new("a.go", "package main\n\nfunc Meh() {}\n")],
        )
        .unwrap();
        let classified = classify(&module, "github.com/paulhatch/plgo").unwrap();
        assert_eq!(classified.name, "demo");
        assert_eq!(classified.functions.len(), 1);
    }
}
