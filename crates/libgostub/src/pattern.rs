use std::path::{Component, Path, PathBuf};

use crate::error::{GostubError, Result};

/// A parsed package pattern, resolved against the module it is loaded from.
///
/// # Format
///
/// A pattern names one package directory or, with a trailing `/...`, a directory and every
/// package below it. Directories can be given relative to the module root or as import paths:
///
/// ```text
/// .                                   the module root package
/// ./...                               every package in the module
/// ./pkg/types                         one package
/// pkg/...                             pkg and everything below it
/// github.com/gostubpkg/testmod/pkg    an import path inside the module
/// ```
///
/// Relative forms are resolved against the directory the loader was started in, which may be a
/// subdirectory of the module root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Directory relative to the module root; empty for the root itself.
    pub dir: PathBuf,
    /// Whether packages below `dir` are matched too.
    pub recursive: bool,
}

impl Pattern {
    /// Resolve `spec` for `module`, with relative forms taken from `cwd`.
    pub fn parse(spec: &str, module: &str, cwd: &Path) -> Result<Self> {
        if spec.is_empty() {
            return Err(GostubError::InvalidPattern(
                "Invalid package pattern: empty string".to_string(),
            ));
        }

        let (base, recursive) = match spec.strip_suffix("...") {
            Some(base) => (base.strip_suffix('/').unwrap_or(base), true),
            None => (spec, false),
        };
        if recursive && !(base.is_empty() || base == "." || spec.ends_with("/...")) {
            return Err(GostubError::InvalidPattern(format!(
                "Wildcards are only supported as a final '/...': {spec}"
            )));
        }
        if base.contains("...") {
            return Err(GostubError::InvalidPattern(format!(
                "Wildcards are only supported as a final '/...': {spec}"
            )));
        }

        let dir = if base == module {
            PathBuf::new()
        } else if let Some(rest) = base.strip_prefix(module).and_then(|r| r.strip_prefix('/')) {
            PathBuf::from(rest)
        } else if base == "." {
            cwd.to_path_buf()
        } else if let Some(rest) = base.strip_prefix("./") {
            cwd.join(rest)
        } else if looks_like_remote_path(base) {
            return Err(GostubError::InvalidPattern(format!(
                "{spec} is not part of module {module}"
            )));
        } else {
            cwd.join(base)
        };

        let mut normalized = PathBuf::new();
        for component in dir.components() {
            let inside = match component {
                Component::Normal(part) => {
                    normalized.push(part);
                    true
                }
                Component::CurDir => true,
                Component::ParentDir => normalized.pop(),
                Component::RootDir | Component::Prefix(_) => false,
            };
            if !inside {
                return Err(GostubError::InvalidPattern(format!(
                    "{spec} must stay inside the module"
                )));
            }
        }

        Ok(Pattern {
            dir: normalized,
            recursive,
        })
    }
}

/// Import paths outside the module start with a domain-like element.
fn looks_like_remote_path(path: &str) -> bool {
    path.split('/')
        .next()
        .is_some_and(|first| first.contains('.') && first != "." && first != "..")
}
