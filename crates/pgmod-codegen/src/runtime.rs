//! Templating of the runtime collaborator `pl.go`.
//!
//! The runtime is shipped as the source of the `plgo` package. Before it can
//! be compiled into the extension it has to become part of `package main`,
//! point cgo at the server include directory of the local PostgreSQL, and
//! declare every exported routine with `PG_FUNCTION_INFO_V1`.

use crate::error::{CodegenError, CodegenResult};

/// Include path written into the runtime's cgo flags.
pub const DEFAULT_INCLUDE_DIR: &str = "/usr/include/postgresql/server";

/// Placeholder replaced with the `PG_FUNCTION_INFO_V1` declarations.
pub const FUNCDEC_MARKER: &str = "//{funcdec}";

/// Produce the staged `pl.go` from the runtime source.
pub fn render_runtime(source: &str, include_dir: &str, func_decs: &[String]) -> CodegenResult<String> {
    let body = strip_package_clause(source).ok_or_else(|| {
        CodegenError::RuntimeTemplate("has no package clause".to_string())
    })?;
    if !body.contains(FUNCDEC_MARKER) {
        return Err(CodegenError::RuntimeTemplate(format!(
            "has no {FUNCDEC_MARKER} marker"
        )));
    }

    let include_dir = include_dir.trim_end_matches(['\n', '\r']);
    let mut out = String::from("package main\n");
    out.push_str(
        &body
            .replacen(DEFAULT_INCLUDE_DIR, include_dir, 1)
            .replacen(FUNCDEC_MARKER, &func_decs.join("\n"), 1),
    );
    Ok(out)
}

/// Everything after the `package <name>` clause line, or `None` if the
/// source never declares a package.
fn strip_package_clause(source: &str) -> Option<&str> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("package") {
            if rest.starts_with([' ', '\t']) {
                return Some(&source[offset + line.len()..]);
            }
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNTIME: &str = "// Package plgo is the runtime\npackage plgo\n\n/*\n#cgo CFLAGS: -I/usr/include/postgresql/server\n//{funcdec}\n*/\nimport \"C\"\n";

    #[test]
    fn test_render_runtime() {
        let out = render_runtime(
            RUNTIME,
            "/opt/pg/include/server\n",
            &["PG_FUNCTION_INFO_V1(Meh);".into(), "PG_FUNCTION_INFO_V1(ConcatAll);".into()],
        )
        .unwrap();
        assert!(out.starts_with("package main\n\n/*\n"));
        assert!(out.contains("-I/opt/pg/include/server\n"));
        assert!(!out.contains("package plgo"));
        assert!(out.contains("PG_FUNCTION_INFO_V1(Meh);\nPG_FUNCTION_INFO_V1(ConcatAll);\n*/"));
        assert!(!out.contains(FUNCDEC_MARKER));
    }

    #[test]
    fn test_comment_mentioning_package_is_not_a_clause() {
        assert_eq!(strip_package_clause("// packaged\npackage x\nrest"), Some("rest"));
    }

    #[test]
    fn test_missing_marker() {
        let err = render_runtime("package plgo\n", DEFAULT_INCLUDE_DIR, &[]).unwrap_err();
        assert!(err.to_string().contains("//{funcdec}"));
    }

    #[test]
    fn test_missing_package_clause() {
        assert!(render_runtime("//{funcdec}\n", DEFAULT_INCLUDE_DIR, &[]).is_err());
    }
}
