//! The `gostubpkg.yaml` configuration file.
//!
//! Keys mirror the command-line flags:
//!
//! ```yaml
//! input-dir: .
//! output-dir: stubs
//! generate-go-mod: true
//! allow-imports:
//!   - k8s.io/api/core/v1
//! function-bodies:
//!   funcs.Bar: panic("not implemented")
//!   types.(*MyStruct).GetPodName: return "StubPodName"
//! goos: linux
//! goarch: amd64
//! tags: [integration]
//! formatter: native
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GostubError, Result};
use crate::imports::FormatterKind;
use crate::overrides::FunctionBodies;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG: &str = "gostubpkg.yaml";

/// Settings read from a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Directory inside the Go module to load from.
    pub input_dir: Option<PathBuf>,
    /// Directory stubs are written under.
    pub output_dir: Option<PathBuf>,
    /// Whether to write a `go.mod` next to the stubs.
    pub generate_go_mod: Option<bool>,
    /// Third-party import paths that survive.
    pub allow_imports: Vec<String>,
    /// Override bodies keyed by `pkg.Func` or `pkg.(*Type).Method`.
    pub function_bodies: BTreeMap<String, String>,
    /// Target operating system.
    pub goos: Option<String>,
    /// Target architecture.
    pub goarch: Option<String>,
    /// Extra build tags.
    pub tags: Vec<String>,
    /// Import formatter.
    pub formatter: Option<FormatterKind>,
}

impl Config {
    /// Parse config text. `path` is used for error reporting only.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| GostubError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load an explicitly requested config file; a missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GostubError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        info!("using config file: {}", path.display());
        Self::parse(path, &text)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_optional(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                info!("using config file: {}", path.display());
                Self::parse(path, &text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(GostubError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// The configured override bodies with their keys parsed.
    pub fn function_bodies(&self) -> Result<FunctionBodies> {
        FunctionBodies::from_pairs(&self.function_bodies)
    }
}
