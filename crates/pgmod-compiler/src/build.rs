//! The external build: `go build -buildmode=c-shared` in the staging directory.

use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::assembler::{METHODS_FILE, PACKAGE_FILE, RUNTIME_FILE};
use crate::error::{CompileError, CompileResult};

/// The `go build` invocation for a staged module.
pub fn build_command(staging_dir: &Path, library: &str) -> Command {
    let mut cmd = Command::new("go");
    cmd.args(["build", "-buildmode=c-shared", "-o", library])
        .args([PACKAGE_FILE, RUNTIME_FILE, METHODS_FILE])
        .current_dir(staging_dir);
    cmd
}

/// Run the build with inherited stdio and wait for it. Never retried.
pub fn run_build(staging_dir: &Path, library: &str) -> CompileResult<()> {
    info!(dir = %staging_dir.display(), library, "running go build");
    let status = build_command(staging_dir, library)
        .status()
        .map_err(CompileError::BuildSpawn)?;
    if !status.success() {
        return Err(CompileError::BuildFailed {
            code: status.code(),
        });
    }
    info!(library, "build finished");
    Ok(())
}
