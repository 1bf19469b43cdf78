//! pgmod code generator: turns classified functions into the text that makes
//! up a PostgreSQL extension.
//!
//! # Outputs
//!
//! Per function, a [`GeneratedArtifact`]:
//! - the `PG_FUNCTION_INFO_V1` declaration for the runtime
//! - a cgo wrapper exported under the function's own name
//! - a `CREATE OR REPLACE FUNCTION` statement
//! - a `COMMENT ON FUNCTION` statement when the function is documented
//!
//! Per module, the files built from them: `methods.go` ([`glue`]), the
//! templated runtime `pl.go` ([`runtime`]), and the catalog script,
//! `.control` file and `Makefile` ([`packaging`]).

pub mod ddl;
pub mod error;
pub mod glue;
pub mod packaging;
pub mod runtime;

use std::collections::HashMap;

use pgmod_types::{Function, GeneratedArtifact};

pub use error::{CodegenError, CodegenResult};
pub use packaging::{Extension, DEFAULT_VERSION};

/// Generate the artifacts of every function, in order.
///
/// Fails if two functions would register the same routine, i.e. share a
/// SQL name and argument types.
pub fn generate(functions: &[Function], module: &str) -> CodegenResult<Vec<GeneratedArtifact>> {
    let mut routines: HashMap<String, &str> = HashMap::new();
    let mut artifacts = Vec::with_capacity(functions.len());

    for function in functions {
        let sig = function.signature();
        let routine = format!("{}({})", sig.sql_name(), ddl::arg_types(sig).join(","));
        if let Some(first) = routines.insert(routine.clone(), function.name()) {
            return Err(CodegenError::DuplicateRoutine {
                routine,
                first: first.to_string(),
                second: function.name().to_string(),
            });
        }

        artifacts.push(GeneratedArtifact {
            func_dec: function.func_dec(),
            glue: glue::generate_glue(function),
            ddl: ddl::generate_ddl(function, module),
            comment: ddl::generate_comment(function),
        });
    }

    Ok(artifacts)
}
