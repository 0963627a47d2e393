//! Reading and writing Go module manifests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GostubError, Result};

/// File name of a Go module manifest.
pub const MANIFEST: &str = "go.mod";

/// The directives of a `go.mod` file that stub generation cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    /// The module path.
    pub module: String,
    /// The `go` directive, if present.
    pub go_version: Option<String>,
}

impl GoMod {
    /// Parse manifest text. `path` is used for error reporting only.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut module = None;
        let mut go_version = None;
        for line in text.lines() {
            let line = line.split("//").next().unwrap_or_default().trim();
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("module"), Some(value)) => module = Some(unquote(value).to_string()),
                (Some("go"), Some(value)) => go_version = Some(value.to_string()),
                _ => {}
            }
        }
        let module = module.ok_or_else(|| GostubError::ManifestParse {
            path: path.to_path_buf(),
            message: "missing module directive".to_string(),
        })?;
        Ok(Self { module, go_version })
    }

    /// Read and parse the manifest at `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GostubError::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(path, &text)
    }

    /// Render the minimal manifest written next to generated stubs.
    pub fn render(&self) -> String {
        match &self.go_version {
            Some(version) => format!("module {}\n\ngo {version}\n", self.module),
            None => format!("module {}\n", self.module),
        }
    }
}

/// Find the directory holding the `go.mod` that governs `start_dir`.
pub fn nearest_manifest(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = start_dir.to_path_buf();
    loop {
        if current_dir.join(MANIFEST).is_file() {
            return Some(current_dir);
        }
        if !current_dir.pop() {
            return None;
        }
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('`').and_then(|v| v.strip_suffix('`')))
        .unwrap_or(value)
}
