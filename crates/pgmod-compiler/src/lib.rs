//! pgmod compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! .go files → Lexer → Parser → Classifier → Rewriter → Codegen → Assembler → go build → .so
//! ```
//!
//! Everything up to and including assembly happens in memory. Files are
//! only written once the whole module classified and generated cleanly, so
//! a failing compile leaves the staging directory untouched.

pub mod assembler;
pub mod build;
pub mod classifier;
pub mod error;
pub mod module;
pub mod options;
pub mod report;
pub mod rewriter;
pub mod toolchain;

use pgmod_codegen::Extension;
use tracing::info;

pub use assembler::{StagedFile, StagedModule};
pub use classifier::{classify, ClassifiedModule};
pub use error::{CompileError, CompileResult};
pub use module::ModuleSource;
pub use options::CompileOptions;
pub use report::CompileReport;

/// Compile the module at `options.module_path` and stage its extension.
pub fn compile(options: &CompileOptions) -> CompileResult<CompileReport> {
    let module = ModuleSource::load(&options.module_path)?;
    let classified = classify(&module, &options.facade_path)?;
    info!(
        module = %classified.name,
        functions = classified.functions.len(),
        warnings = classified.warnings.total_warnings,
        "classified module"
    );

    let runtime_source = toolchain::read_runtime(options.runtime.as_deref())?;
    let include_dir = toolchain::include_dir(options.include_dir.as_deref())?;
    let staged = stage(&module, &classified, options, &runtime_source, &include_dir)?;

    let out_dir = options.resolved_out_dir();
    staged.write_to(&out_dir)?;
    info!(
        module = %staged.name,
        functions = classified.functions.len(),
        dir = %out_dir.display(),
        "staged extension"
    );

    let mut report = CompileReport::new(&classified, &staged, out_dir.clone());
    if options.build {
        let library = Extension::new(&classified.name, &options.version).library_file_name();
        build::run_build(&out_dir, &library)?;
        report.built = true;
    }
    Ok(report)
}

/// Rewrite and generate a classified module without touching the disk.
pub fn stage(
    module: &ModuleSource,
    classified: &ClassifiedModule,
    options: &CompileOptions,
    runtime_source: &str,
    include_dir: &str,
) -> CompileResult<StagedModule> {
    let package_source = rewriter::rewrite_module(module, classified);
    let artifacts = pgmod_codegen::generate(&classified.functions, &classified.name)?;

    let extension = Extension::new(&classified.name, &options.version)
        .with_description(options.description.as_deref());
    assembler::assemble(
        classified,
        &artifacts,
        assembler::AssemblyInputs {
            package_source: &package_source,
            runtime_source,
            include_dir,
            extension,
        },
    )
}
