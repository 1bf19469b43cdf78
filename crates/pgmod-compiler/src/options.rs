//! Compile configuration.

use std::path::PathBuf;

pub use pgmod_codegen::DEFAULT_VERSION;
use serde::{Deserialize, Serialize};

/// Import path of the facade package user modules program against.
pub const DEFAULT_FACADE_PATH: &str = "github.com/paulhatch/plgo";

/// Name of the staging directory created inside the module by default.
pub const DEFAULT_OUT_DIR: &str = "build";

/// Everything one compile needs to know besides the module sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Directory holding the module's `.go` files.
    pub module_path: PathBuf,
    /// Staging directory; `<module_path>/build` when unset.
    pub out_dir: Option<PathBuf>,
    /// Extension version, used in the script name and control file.
    pub version: String,
    /// Control file comment; `<module> extension` when unset.
    pub description: Option<String>,
    /// Explicit runtime `pl.go`; searched in `$GOPATH` when unset.
    pub runtime: Option<PathBuf>,
    /// PostgreSQL server include directory; asked from `pg_config` when unset.
    pub include_dir: Option<PathBuf>,
    pub facade_path: String,
    /// Run `go build` after staging.
    pub build: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from("."),
            out_dir: None,
            version: DEFAULT_VERSION.to_string(),
            description: None,
            runtime: None,
            include_dir: None,
            facade_path: DEFAULT_FACADE_PATH.to_string(),
            build: true,
        }
    }
}

impl CompileOptions {
    pub fn new(module_path: impl Into<PathBuf>) -> Self {
        Self {
            module_path: module_path.into(),
            ..Self::default()
        }
    }

    /// The staging directory this compile writes to.
    pub fn resolved_out_dir(&self) -> PathBuf {
        match &self.out_dir {
            Some(dir) => dir.clone(),
            None => self.module_path.join(DEFAULT_OUT_DIR),
        }
    }
}
