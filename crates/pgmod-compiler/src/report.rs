//! Machine-readable summary of a compile, printed by `pgmod --json`.

use std::path::PathBuf;

use pgmod_types::{FunctionKind, PgmodError};
use serde::Serialize;
use sha2::{Digest as _, Sha256};

use crate::assembler::StagedModule;
use crate::classifier::ClassifiedModule;

#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    pub module: String,
    pub out_dir: PathBuf,
    pub functions: Vec<FunctionSummary>,
    /// Staged file names, in write order.
    pub files: Vec<String>,
    /// Hex SHA-256 of the staged `package.go`.
    pub source_sha256: String,
    /// Whether `go build` ran and succeeded.
    pub built: bool,
    pub warnings: Vec<PgmodError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSummary {
    pub name: String,
    pub kind: FunctionKind,
    pub sql_name: String,
    pub internal_name: String,
}

impl CompileReport {
    pub fn new(classified: &ClassifiedModule, staged: &StagedModule, out_dir: PathBuf) -> Self {
        let functions = classified
            .functions
            .iter()
            .map(|f| FunctionSummary {
                name: f.name().to_string(),
                kind: f.kind(),
                sql_name: f.signature().sql_name(),
                internal_name: f.signature().internal_name(),
            })
            .collect();
        let source = staged
            .file(crate::assembler::PACKAGE_FILE)
            .map(|f| f.contents.as_str())
            .unwrap_or("");

        Self {
            module: classified.name.clone(),
            out_dir,
            functions,
            files: staged.files.iter().map(|f| f.name.clone()).collect(),
            source_sha256: sha256_hex(source),
            built: false,
            warnings: classified.warnings.warnings.clone(),
        }
    }
}

pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex("package main\n").len(), 64);
    }
}
