//! Classifier tests.
//!
//! Covers: the three function shapes, parameter and result type mapping,
//! nullable parameters and optional results, trigger shape validation,
//! naming rules, exported methods, internal-name collisions and the
//! module-structure checks done while loading.

use pgmod_compiler::classifier::{classify, ClassifiedModule};
use pgmod_compiler::{CompileError, ModuleSource};
use pgmod_types::{Datum, ErrorCode, Function, FunctionKind, Param, PgmodError, SourceFile, TypeTag};

const FACADE: &str = "github.com/paulhatch/plgo";

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn module(files: &[(&str, &str)]) -> Result<ModuleSource, CompileError> {
    let sources = files
        .iter()
        .map(|(name, text)| SourceFile::new(*name, *text))
        .collect();
    ModuleSource::from_sources("example", sources)
}

/// A single-file module importing the facade, holding `decls`.
fn source(decls: &str) -> String {
    format!("package main\n\nimport \"{FACADE}\"\n\n{decls}\n")
}

fn classify_src(decls: &str) -> Result<ClassifiedModule, CompileError> {
    let module = module(&[("main.go", &source(decls))])?;
    classify(&module, FACADE)
}

fn classify_ok(decls: &str) -> ClassifiedModule {
    match classify_src(decls) {
        Ok(classified) => classified,
        Err(err) => panic!("unexpected failure:\n{err}"),
    }
}

fn only_function(decls: &str) -> Function {
    let classified = classify_ok(decls);
    assert_eq!(classified.functions.len(), 1, "{:?}", classified.functions);
    classified.functions.into_iter().next().unwrap()
}

fn errors_of(result: Result<impl std::fmt::Debug, CompileError>) -> Vec<PgmodError> {
    match result {
        Ok(value) => panic!("expected diagnostics, got {value:?}"),
        Err(err) => err
            .diagnostics()
            .unwrap_or_else(|| panic!("expected diagnostics, got {err}"))
            .errors
            .clone(),
    }
}

fn assert_error(decls: &str, code: ErrorCode) -> PgmodError {
    let errors = errors_of(classify_src(decls));
    errors
        .iter()
        .find(|e| e.code == code)
        .cloned()
        .unwrap_or_else(|| panic!("expected {code}, got:\n{errors:#?}"))
}

fn scalar_return(function: &Function) -> (TypeTag, bool) {
    match function {
        Function::Scalar {
            returns, optional, ..
        } => (*returns, *optional),
        other => panic!("expected scalar, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Function shapes
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_void_function_with_doc() {
    let function = only_function(
        "// Meh prints out message to error elog\nfunc Meh() {\n\tplgo.NewErrorLogger(\"\", 0).Println(\"meh\")\n}",
    );
    assert_eq!(function.kind(), FunctionKind::Void);
    assert_eq!(function.name(), "Meh");
    assert!(function.params().is_empty());
    assert_eq!(
        function.signature().doc.as_deref(),
        Some("Meh prints out message to error elog")
    );
}

#[test]
fn test_concat_all_is_scalar() {
    let function = only_function(
        "func ConcatAll(tableName string, colName string) string {\n\treturn tableName + colName\n}",
    );
    assert_eq!(function.kind(), FunctionKind::Scalar);
    assert_eq!(
        function.params(),
        &[
            Param::new("tableName", TypeTag::scalar(Datum::String)),
            Param::new("colName", TypeTag::scalar(Datum::String)),
        ]
    );
    assert_eq!(scalar_return(&function), (TypeTag::scalar(Datum::String), false));
    assert_eq!(function.signature().doc, None);
}

#[test]
fn test_grouped_parameters_expand_in_order() {
    let function = only_function("func ConcatAll(tableName, colName string) string { return \"\" }");
    let names: Vec<_> = function.params().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["tableName", "colName"]);
}

#[test]
fn test_trigger_strips_context_parameter() {
    let function = only_function(
        "// CreatedTimeTrigger example trigger\nfunc CreatedTimeTrigger(td *plgo.TriggerData) *plgo.TriggerRow {\n\treturn td.NewRow\n}",
    );
    assert_eq!(function.kind(), FunctionKind::Trigger);
    assert!(function.params().is_empty());
}

#[test]
fn test_trigger_keeps_following_parameters() {
    let function = only_function(
        "func Stamp(td *plgo.TriggerData, column string, offset int32) *plgo.TriggerRow { return td.NewRow }",
    );
    assert_eq!(function.kind(), FunctionKind::Trigger);
    assert_eq!(
        function.params(),
        &[
            Param::new("column", TypeTag::scalar(Datum::String)),
            Param::new("offset", TypeTag::scalar(Datum::Int32)),
        ]
    );
}

#[test]
fn test_trigger_context_may_be_unnamed() {
    let function = only_function("func Noop(*plgo.TriggerData) *plgo.TriggerRow { return nil }");
    assert_eq!(function.kind(), FunctionKind::Trigger);
}

#[test]
fn test_trigger_through_import_alias() {
    let src = format!(
        "package main\n\nimport pg \"{FACADE}\"\n\nfunc Stamp(td *pg.TriggerData) *pg.TriggerRow {{ return td.NewRow }}\n"
    );
    let module = module(&[("main.go", &src)]).unwrap();
    let classified = classify(&module, FACADE).unwrap();
    assert_eq!(classified.functions[0].kind(), FunctionKind::Trigger);
}

// ─────────────────────────────────────────────────────────────────────
// Type mapping
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_every_table_scalar_is_accepted() {
    for datum in Datum::ALL.into_iter().filter(|d| *d != Datum::TriggerRow) {
        let ty = datum.go_type();
        let function = only_function(&format!("func F(v {ty}) {ty} {{ return v }}"));
        assert_eq!(
            function.params()[0].ty,
            TypeTag::scalar(datum),
            "parameter of type {ty}"
        );
        assert_eq!(scalar_return(&function).0, TypeTag::scalar(datum), "result {ty}");
    }
}

#[test]
fn test_array_parameters_and_results() {
    let function = only_function("func F(names []string, at []time.Time) []int64 { return nil }");
    assert_eq!(function.params()[0].ty, TypeTag::array_of(Datum::String).unwrap());
    assert_eq!(function.params()[1].ty, TypeTag::array_of(Datum::Time).unwrap());
    assert_eq!(scalar_return(&function).0, TypeTag::array_of(Datum::Int64).unwrap());
}

#[test]
fn test_byte_slice_is_scalar_bytea() {
    let function = only_function("func Gzip(data []byte) []byte { return data }");
    assert_eq!(function.params()[0].ty, TypeTag::scalar(Datum::Bytes));
    assert_eq!(function.params()[0].ty.sql_type(), "bytea");
}

#[test]
fn test_pointer_parameter_is_nullable() {
    let function = only_function("func Coalesce(a *int64, b int64) int64 { return b }");
    assert_eq!(
        function.params(),
        &[
            Param::nullable("a", TypeTag::scalar(Datum::Int64)),
            Param::new("b", TypeTag::scalar(Datum::Int64)),
        ]
    );
    assert!(function.signature().has_nullable_param());
}

#[test]
fn test_pointer_result_is_optional() {
    let function = only_function("func Find(key string) *string { return nil }");
    assert_eq!(scalar_return(&function), (TypeTag::scalar(Datum::String), true));
}

#[test]
fn test_error_result_is_scalar_text() {
    let function = only_function("func Check() error { return nil }");
    assert_eq!(scalar_return(&function).0.sql_type(), "text");
}

// ─────────────────────────────────────────────────────────────────────
// Rejections
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unsupported_parameter_type() {
    let err = assert_error(
        "func Count(m map[string]int) int { return len(m) }",
        ErrorCode::UNSUPPORTED_PARAM_TYPE,
    );
    assert!(err.message.contains("Count"), "{}", err.message);
    assert!(err.message.contains("parameter m"), "{}", err.message);
    assert!(err.message.contains("map[string]int"), "{}", err.message);
    assert!(err.suggestion.is_some());
}

#[test]
fn test_pointer_to_slice_parameter_rejected() {
    assert_error("func F(a *[]string) {}", ErrorCode::UNSUPPORTED_PARAM_TYPE);
}

#[test]
fn test_non_pointer_trigger_data_rejected() {
    assert_error(
        "func F(td plgo.TriggerData) {}",
        ErrorCode::UNSUPPORTED_PARAM_TYPE,
    );
}

#[test]
fn test_unsupported_result_type() {
    let err = assert_error(
        "func F() map[string]int { return nil }",
        ErrorCode::UNSUPPORTED_RETURN_TYPE,
    );
    assert!(err.message.contains("map[string]int"), "{}", err.message);
}

#[test]
fn test_multiple_results_rejected() {
    assert_error(
        "func F() (string, error) { return \"\", nil }",
        ErrorCode::MULTIPLE_RETURN_VALUES,
    );
    assert_error("func F() (a, b int) { return }", ErrorCode::MULTIPLE_RETURN_VALUES);
}

#[test]
fn test_unnamed_parameter_rejected() {
    assert_error("func F(int) int { return 0 }", ErrorCode::UNNAMED_PARAMETER);
    assert_error("func F(_ int) int { return 0 }", ErrorCode::UNNAMED_PARAMETER);
}

#[test]
fn test_parameter_names_used_by_the_wrapper_rejected() {
    let errors = errors_of(classify_src(
        "func Echo(err string, ret string) string { return err + ret }",
    ));
    assert_eq!(errors.len(), 2, "{errors:#?}");
    assert!(errors.iter().all(|e| e.code == ErrorCode::RESERVED_PARAMETER_NAME));
    assert!(errors[0].message.contains("parameter name err"), "{}", errors[0].message);
    assert!(errors[1].message.contains("parameter name ret"), "{}", errors[1].message);

    for decl in [
        "func F(fcinfo int64) {}",
        "func F(C string) {}",
        "func F(toDatum bool) {}",
        "func Echo(echo string) string { return echo }",
    ] {
        assert_error(decl, ErrorCode::RESERVED_PARAMETER_NAME);
    }
}

#[test]
fn test_ordinary_parameter_names_accepted() {
    let function = only_function("func Echo(errText string, result string) string { return errText }");
    let names: Vec<&str> = function.params().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["errText", "result"]);
}

#[test]
fn test_trigger_data_not_first_names_position() {
    let err = assert_error(
        "func F(n int, td *plgo.TriggerData) *plgo.TriggerRow { return nil }",
        ErrorCode::TRIGGER_DATA_NOT_FIRST,
    );
    assert!(err.message.contains("position 2"), "{}", err.message);
}

#[test]
fn test_grouped_trigger_data_rejected() {
    assert_error(
        "func F(a, b *plgo.TriggerData) *plgo.TriggerRow { return nil }",
        ErrorCode::TRIGGER_DATA_GROUPED,
    );
}

#[test]
fn test_trigger_row_without_data_rejected() {
    assert_error(
        "func F(n int) *plgo.TriggerRow { return nil }",
        ErrorCode::TRIGGER_ROW_WITHOUT_DATA,
    );
}

#[test]
fn test_trigger_data_without_row_rejected() {
    assert_error("func F(td *plgo.TriggerData) {}", ErrorCode::TRIGGER_DATA_WITHOUT_ROW);
    assert_error(
        "func F(td *plgo.TriggerData) string { return \"\" }",
        ErrorCode::TRIGGER_DATA_WITHOUT_ROW,
    );
}

#[test]
fn test_errors_from_every_function_are_reported() {
    let errors = errors_of(classify_src(
        "func A(m map[string]int) {}\n\nfunc B() (int, int) { return 0, 0 }\n\nfunc C() {}",
    ));
    let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        vec![ErrorCode::UNSUPPORTED_PARAM_TYPE, ErrorCode::MULTIPLE_RETURN_VALUES]
    );
}

#[test]
fn test_diagnostic_points_at_source() {
    let err = assert_error("func Count(m map[string]int) int { return 0 }", ErrorCode::UNSUPPORTED_PARAM_TYPE);
    assert_eq!(err.file, "main.go");
    assert_eq!(err.span.start_line, 5);
    assert_eq!(err.source_line, "func Count(m map[string]int) int { return 0 }");
}

// ─────────────────────────────────────────────────────────────────────
// Naming
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexported_functions_are_ignored() {
    let classified = classify_ok("func helper() int { return 1 }\n\nfunc init() {}\n\nfunc main() {}");
    assert!(classified.functions.is_empty());
}

#[test]
fn test_exported_method_is_skipped_with_warning() {
    let classified = classify_ok(
        "type Calc struct{}\n\nfunc (c Calc) Double(n int64) int64 { return n * 2 }\n\nfunc Meh() {}",
    );
    let names: Vec<_> = classified.functions.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["Meh"]);
    assert_eq!(classified.warnings.total_warnings, 1);
    assert_eq!(classified.warnings.warnings[0].code, ErrorCode::EXPORTED_METHOD);
}

#[test]
fn test_internal_name_collision() {
    let err = assert_error(
        "func ConcatAll(a string) string { return concatAll(a) }\n\nfunc concatAll(a string) string { return a }",
        ErrorCode::INTERNAL_NAME_COLLISION,
    );
    assert!(err.message.contains("concatAll"), "{}", err.message);
}

#[test]
fn test_internal_name_collision_with_variable() {
    assert_error(
        "var meh = 1\n\nfunc Meh() {}",
        ErrorCode::INTERNAL_NAME_COLLISION,
    );
}

#[test]
fn test_internal_name_cannot_be_keyword_or_builtin() {
    let errors = errors_of(classify_src(
        "func Select(x string) string { return x }\n\n\
         func Len(x string) int64 { return int64(len(x)) }\n\n\
         func String(x int64) string { return \"\" }",
    ));
    assert_eq!(errors.len(), 3, "{errors:#?}");
    assert!(errors.iter().all(|e| e.code == ErrorCode::INTERNAL_NAME_COLLISION));
    assert!(errors[0].message.contains("select, which is a Go keyword"), "{}", errors[0].message);
    assert!(errors[1].message.contains("len, which is a predeclared Go identifier"), "{}", errors[1].message);
    assert_eq!(errors[1].span.start_line, 7);
    assert!(errors[2].message.contains("string"), "{}", errors[2].message);

    for decl in [
        "func Map() {}",
        "func Range() {}",
        "func Default() {}",
        "func Error() {}",
        "func Append() {}",
        "func Main() {}",
        "func Init() {}",
    ] {
        assert_error(decl, ErrorCode::INTERNAL_NAME_COLLISION);
    }
}

#[test]
fn test_names_containing_keywords_accepted() {
    let classified = classify_ok("func SelectAll() {}\n\nfunc Lens() {}\n\nfunc MainLoop() {}");
    assert_eq!(classified.functions.len(), 3);
}

// ─────────────────────────────────────────────────────────────────────
// Module structure
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_functions_follow_file_order() {
    let module = module(&[
        ("a.go", "package main\n\nfunc Zeta() {}\n"),
        ("b.go", "package main\n\nfunc Alpha() {}\n"),
    ])
    .unwrap();
    let classified = classify(&module, FACADE).unwrap();
    let names: Vec<_> = classified.functions.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha"]);
    assert_eq!(classified.name, "example");
    assert_eq!(classified.facade_path, FACADE);
}

#[test]
fn test_empty_module_rejected() {
    let errors = errors_of(module(&[]));
    assert_eq!(errors[0].code, ErrorCode::NO_SOURCE_FILES);
}

#[test]
fn test_mixed_packages_rejected() {
    let errors = errors_of(module(&[
        ("a.go", "package main\n"),
        ("b.go", "package other\n"),
    ]));
    assert_eq!(errors[0].code, ErrorCode::MULTIPLE_PACKAGES);
    assert_eq!(errors[0].file, "b.go");
}

#[test]
fn test_non_main_package_rejected() {
    let errors = errors_of(module(&[("a.go", "package plgo\n")]));
    assert_eq!(errors[0].code, ErrorCode::NOT_PACKAGE_MAIN);
}

#[test]
fn test_syntax_errors_surface_from_loading() {
    let errors = errors_of(module(&[("a.go", "func Meh() {}\n")]));
    assert_eq!(errors[0].code, ErrorCode::MISSING_PACKAGE_CLAUSE);
}

#[test]
fn test_load_skips_test_files_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("ext");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("b.go"), "package main\n\nfunc B() {}\n").unwrap();
    std::fs::write(root.join("a.go"), "package main\n\nfunc A() {}\n").unwrap();
    std::fs::write(root.join("a_test.go"), "package main_test\n").unwrap();
    std::fs::write(root.join("notes.txt"), "not go").unwrap();

    let module = ModuleSource::load(&root).unwrap();
    assert_eq!(module.name, "ext");
    let files: Vec<_> = module.files.iter().map(|f| f.source.name.as_str()).collect();
    assert_eq!(files, vec!["a.go", "b.go"]);
}

#[test]
fn test_load_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = ModuleSource::load(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }), "got {err}");
}
