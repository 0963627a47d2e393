//! Final clean-up of generated files: pruning and grouping imports, canonical layout.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GostubError, Result};
use crate::lexer::{TokenKind, tokenize};
use crate::parser::parse_file;
use crate::printer::{is_std_path, print_file};

/// Turns raw stub text into the final contents of the file at `path`.
pub trait ImportFormatter {
    /// Format `source`, which will be written to `path`.
    fn process(&self, path: &Path, source: &str) -> Result<String>;
}

/// Which [`ImportFormatter`] to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// Built-in formatter.
    #[default]
    Native,
    /// The external `goimports` tool.
    GoImports,
}

impl FormatterKind {
    /// Instantiate the formatter, locating external binaries.
    pub fn build(self) -> Result<Box<dyn ImportFormatter>> {
        Ok(match self {
            Self::Native => Box::new(NativeImports),
            Self::GoImports => Box::new(GoImports::locate()?),
        })
    }
}

impl fmt::Display for FormatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Native => "native",
            Self::GoImports => "goimports",
        })
    }
}

impl FromStr for FormatterKind {
    type Err = GostubError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "native" => Ok(Self::Native),
            "goimports" => Ok(Self::GoImports),
            other => Err(GostubError::FormatterNotFound(other.to_string())),
        }
    }
}

/// Drops unreferenced imports, groups standard-library imports first and prints the file
/// canonically.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeImports;

impl ImportFormatter for NativeImports {
    fn process(&self, path: &Path, source: &str) -> Result<String> {
        let format_error = |message: String| GostubError::Format {
            path: path.to_path_buf(),
            message,
        };
        let mut file = parse_file(source).map_err(|e| format_error(e.to_string()))?;
        let used = qualifiers(source).map_err(|e| format_error(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut imports: Vec<_> = std::mem::take(&mut file.imports)
            .into_iter()
            .filter(|import| {
                let keep = import.bound_name().is_none_or(|name| used.contains(&name));
                if !keep {
                    debug!("removing unused import {:?} from {}", import.path, path.display());
                }
                keep && seen.insert((import.alias.clone(), import.path.clone()))
            })
            .collect();
        imports.sort_by(|a, b| {
            (!is_std_path(&a.path), &a.path, &a.alias).cmp(&(!is_std_path(&b.path), &b.path, &b.alias))
        });
        file.imports = imports;
        Ok(print_file(&file))
    }
}

/// Every `name` used as `name.Member` outside import declarations.
fn qualifiers(source: &str) -> std::result::Result<BTreeSet<String>, crate::parser::SyntaxError> {
    let tokens = tokenize(source)?;
    let mut used = BTreeSet::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.kind == TokenKind::Import {
            // Skip the whole declaration, grouped or not.
            let mut depth = 0usize;
            while let Some(t) = tokens.get(i) {
                match t.kind {
                    TokenKind::LParen => depth += 1,
                    TokenKind::RParen => depth = depth.saturating_sub(1),
                    TokenKind::Semi if depth == 0 => break,
                    _ => {}
                }
                i += 1;
            }
            continue;
        }
        let selected = token.kind == TokenKind::Ident
            && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::Dot)
            && (i == 0 || tokens[i - 1].kind != TokenKind::Dot);
        if selected {
            used.insert(token.text.to_string());
        }
        i += 1;
    }
    Ok(used)
}

/// Runs the `goimports` binary over each file.
#[derive(Debug, Clone)]
pub struct GoImports {
    binary: PathBuf,
}

impl GoImports {
    /// Binary name looked up on `PATH`.
    pub const BINARY: &'static str = "goimports";

    /// Find `goimports` on `PATH`.
    pub fn locate() -> Result<Self> {
        let binary = which::which(Self::BINARY)
            .map_err(|_| GostubError::FormatterNotFound(Self::BINARY.to_string()))?;
        Ok(Self::with_binary(binary))
    }

    /// Use the binary at `binary`.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl ImportFormatter for GoImports {
    fn process(&self, path: &Path, source: &str) -> Result<String> {
        let srcdir = path.parent().unwrap_or(Path::new("."));
        let mut child = Command::new(&self.binary)
            .arg("-srcdir")
            .arg(srcdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(GostubError::Format {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| GostubError::Format {
            path: path.to_path_buf(),
            message: format!("Invalid UTF-8 in goimports output: {e}"),
        })
    }
}
