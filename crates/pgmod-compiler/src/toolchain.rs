//! Locating the local collaborators: the runtime source `pl.go` and the
//! PostgreSQL server include directory.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{CompileError, CompileResult};

/// Where the runtime lives below a `$GOPATH` entry.
const RUNTIME_IN_GOPATH: &str = "src/github.com/paulhatch/plgo/pl.go";

/// Read the runtime source: `explicit` if given, else the first `$GOPATH`
/// entry that has it.
pub fn read_runtime(explicit: Option<&Path>) -> CompileResult<String> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "reading runtime");
        return fs::read_to_string(path).map_err(|e| CompileError::io(path, e));
    }

    let candidates = runtime_candidates(env::var_os("GOPATH"), env::var_os("HOME"));
    for path in &candidates {
        match fs::read_to_string(path) {
            Ok(source) => {
                debug!(path = %path.display(), "found runtime");
                return Ok(source);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(CompileError::io(path, e)),
        }
    }
    Err(CompileError::RuntimeNotFound {
        searched: candidates,
    })
}

/// Runtime paths to try, in `$GOPATH` order. An unset or empty `$GOPATH`
/// means `$HOME/go`.
pub fn runtime_candidates(gopath: Option<OsString>, home: Option<OsString>) -> Vec<PathBuf> {
    let roots: Vec<PathBuf> = match gopath.filter(|g| !g.is_empty()) {
        Some(gopath) => env::split_paths(&gopath)
            .filter(|p| !p.as_os_str().is_empty())
            .collect(),
        None => home.map(|h| PathBuf::from(h).join("go")).into_iter().collect(),
    };
    roots
        .into_iter()
        .map(|root| root.join(RUNTIME_IN_GOPATH))
        .collect()
}

/// The server include directory: `explicit` if given, else
/// `pg_config --includedir-server`.
pub fn include_dir(explicit: Option<&Path>) -> CompileResult<String> {
    if let Some(dir) = explicit {
        return Ok(dir.display().to_string());
    }

    let output = Command::new("pg_config")
        .arg("--includedir-server")
        .output()
        .map_err(|e| CompileError::PgConfig(e.to_string()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CompileError::PgConfig(format!(
            "{} {}",
            output.status,
            stderr.trim()
        )));
    }
    let dir = String::from_utf8_lossy(&output.stdout)
        .trim_end_matches(['\n', '\r'])
        .to_string();
    debug!(include_dir = %dir, "asked pg_config");
    Ok(dir)
}
