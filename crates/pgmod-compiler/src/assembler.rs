//! Module assembly: every staged file, built in memory, then written out.

use std::fs;
use std::path::{Path, PathBuf};

use pgmod_codegen::runtime::render_runtime;
use pgmod_codegen::{glue, Extension};
use pgmod_types::GeneratedArtifact;
use tracing::debug;

use crate::classifier::ClassifiedModule;
use crate::error::{CompileError, CompileResult};

pub const PACKAGE_FILE: &str = "package.go";
pub const RUNTIME_FILE: &str = "pl.go";
pub const METHODS_FILE: &str = "methods.go";
pub const MAKEFILE: &str = "Makefile";

/// One file of the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub contents: String,
}

impl StagedFile {
    fn new(name: impl Into<String>, contents: String) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }
}

/// The complete staging directory of one extension.
#[derive(Debug, Clone)]
pub struct StagedModule {
    pub name: String,
    pub files: Vec<StagedFile>,
}

/// Inputs the assembler does not derive from the module itself.
#[derive(Debug, Clone)]
pub struct AssemblyInputs<'a> {
    /// Rewritten user source.
    pub package_source: &'a str,
    /// Untemplated runtime source.
    pub runtime_source: &'a str,
    pub include_dir: &'a str,
    pub extension: Extension<'a>,
}

/// Build every staged file. Nothing touches the disk here.
pub fn assemble(
    classified: &ClassifiedModule,
    artifacts: &[GeneratedArtifact],
    inputs: AssemblyInputs<'_>,
) -> CompileResult<StagedModule> {
    let func_decs: Vec<String> = artifacts.iter().map(|a| a.func_dec.clone()).collect();
    let runtime = render_runtime(inputs.runtime_source, inputs.include_dir, &func_decs)?;
    let methods = glue::methods_source(
        &classified.functions,
        artifacts.iter().map(|a| a.glue.as_str()),
    );
    let ext = inputs.extension;

    let files = vec![
        StagedFile::new(PACKAGE_FILE, inputs.package_source.to_string()),
        StagedFile::new(RUNTIME_FILE, runtime),
        StagedFile::new(METHODS_FILE, methods),
        StagedFile::new(ext.script_file_name(), ext.sql_script(artifacts)),
        StagedFile::new(ext.control_file_name(), ext.control_file()),
        StagedFile::new(MAKEFILE, ext.makefile()),
    ];
    Ok(StagedModule {
        name: classified.name.clone(),
        files,
    })
}

impl StagedModule {
    pub fn file(&self, name: &str) -> Option<&StagedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Create `dir` if needed and write every file into it.
    pub fn write_to(&self, dir: &Path) -> CompileResult<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|e| CompileError::io(dir, e))?;
        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let path = dir.join(&file.name);
            fs::write(&path, &file.contents).map_err(|e| CompileError::io(&path, e))?;
            debug!(path = %path.display(), bytes = file.contents.len(), "staged file");
            written.push(path);
        }
        Ok(written)
    }
}
