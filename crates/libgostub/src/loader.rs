//! Resolve package patterns against a Go module and parse the selected files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::ast::SourceFile;
use crate::constraint::BuildContext;
use crate::error::{GostubError, Result};
use crate::gomod::{GoMod, MANIFEST, nearest_manifest};
use crate::parser::parse_file;
use crate::pattern::Pattern;

/// The module that governs an input directory.
#[derive(Debug, Clone)]
pub struct Module {
    /// Directory holding `go.mod`.
    pub root: PathBuf,
    /// Its parsed `go.mod`.
    pub manifest: GoMod,
}

impl Module {
    /// Locate the module for `dir` by searching it and its parents for `go.mod`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let dir = std::path::absolute(dir)?;
        let root = nearest_manifest(&dir).ok_or_else(|| GostubError::ManifestNotFound(dir))?;
        let manifest = GoMod::from_path(&root.join(MANIFEST))?;
        Ok(Self { root, manifest })
    }

    /// The import path of a directory relative to the module root.
    pub fn import_path(&self, relative_dir: &Path) -> String {
        let mut path = self.manifest.module.clone();
        for component in relative_dir.components() {
            path.push('/');
            path.push_str(&component.as_os_str().to_string_lossy());
        }
        path
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct PackageFile {
    /// Path on disk.
    pub path: PathBuf,
    /// Parsed contents.
    pub syntax: SourceFile,
}

/// One Go package: every selected file of a directory.
#[derive(Debug, Clone)]
pub struct Package {
    /// Full import path.
    pub path: String,
    /// Name from the package clause.
    pub name: String,
    /// Source directory.
    pub dir: PathBuf,
    /// Files sorted by file name.
    pub files: Vec<PackageFile>,
}

/// Loads packages of one module for one build target.
#[derive(Debug, Clone)]
pub struct Loader {
    module: Module,
    /// Input directory relative to the module root.
    cwd: PathBuf,
    ctx: BuildContext,
}

impl Loader {
    /// A loader for the module containing `input_dir`.
    pub fn new(input_dir: &Path, ctx: BuildContext) -> Result<Self> {
        let module = Module::discover(input_dir)?;
        let input_dir = std::path::absolute(input_dir)?;
        let cwd = input_dir
            .strip_prefix(&module.root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self { module, cwd, ctx })
    }

    /// The module being loaded from.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Load every package matched by `patterns`, sorted and deduplicated by import path.
    pub fn load(&self, patterns: &[String]) -> Result<Vec<Package>> {
        let mut packages = BTreeMap::new();
        for spec in patterns {
            let pattern = Pattern::parse(spec, &self.module.manifest.module, &self.cwd)?;
            for dir in self.candidate_dirs(spec, &pattern)? {
                let relative = dir
                    .strip_prefix(&self.module.root)
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                let path = self.module.import_path(&relative);
                if packages.contains_key(&path) {
                    continue;
                }
                if let Some(package) = self.load_dir(path.clone(), &dir)? {
                    packages.insert(path, package);
                }
            }
        }
        if packages.is_empty() {
            return Err(GostubError::NoPackages(patterns.join(" ")));
        }
        Ok(packages.into_values().collect())
    }

    fn candidate_dirs(&self, spec: &str, pattern: &Pattern) -> Result<Vec<PathBuf>> {
        let start = self.module.root.join(&pattern.dir);
        if !start.is_dir() {
            return Err(GostubError::InvalidPattern(format!(
                "{spec}: directory {} does not exist",
                start.display()
            )));
        }
        if !pattern.recursive {
            return Ok(vec![start]);
        }
        let mut dirs = Vec::new();
        let walker = WalkDir::new(&start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry.path()));
        for entry in walker {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }
        Ok(dirs)
    }

    /// Parse the selected files of `dir`. Returns `None` when no file survives selection.
    fn load_dir(&self, path: String, dir: &Path) -> Result<Option<Package>> {
        let mut names: Vec<String> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_go_source(name) && self.ctx.matches_file_name(name))
            .collect();
        names.sort();

        let mut name: Option<String> = None;
        let mut files = Vec::new();
        for file_name in names {
            let file_path = dir.join(&file_name);
            let src = fs::read_to_string(&file_path)?;
            match self.ctx.matches_source(&src) {
                Ok(true) => {}
                Ok(false) => {
                    debug!("excluding {} by build constraints", file_path.display());
                    continue;
                }
                Err(message) => {
                    warn!("skipping {}: {message}", file_path.display());
                    continue;
                }
            }
            let syntax = parse_file(&src).map_err(|source| GostubError::Parse {
                path: file_path.clone(),
                source,
            })?;
            match &name {
                None => name = Some(syntax.package.clone()),
                Some(expected) if *expected != syntax.package => {
                    warn!(
                        "skipping {}: package {} does not match package {expected}",
                        file_path.display(),
                        syntax.package
                    );
                    continue;
                }
                Some(_) => {}
            }
            trace!("parsed {}", file_path.display());
            files.push(PackageFile {
                path: file_path,
                syntax,
            });
        }

        let Some(name) = name else {
            return Ok(None);
        };
        debug!("loaded package {path} ({} files)", files.len());
        Ok(Some(Package {
            path,
            name,
            dir: dir.to_path_buf(),
            files,
        }))
    }
}

/// Directories `./...` never descends into: test data, vendored code, hidden or `_` directories
/// and nested modules.
fn is_skipped_dir(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name == "testdata"
        || name == "vendor"
        || name.starts_with('.')
        || name.starts_with('_')
        || path.join(MANIFEST).is_file()
}

fn is_go_source(file_name: &str) -> bool {
    file_name.ends_with(".go")
        && !file_name.ends_with("_test.go")
        && !file_name.starts_with('.')
        && !file_name.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn module(files: &[(&str, &str)]) -> TempDir {
        let root = tempdir().unwrap();
        fs::write(
            root.path().join(MANIFEST),
            "module example.com/m\n\ngo 1.21\n",
        )
        .unwrap();
        for (path, contents) in files {
            let path = root.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        root
    }

    fn linux() -> BuildContext {
        BuildContext::new("linux", "amd64")
    }

    fn paths(packages: &[Package]) -> Vec<&str> {
        packages.iter().map(|p| p.path.as_str()).collect()
    }

    #[test]
    fn test_load_all() -> Result<()> {
        let root = module(&[
            ("main.go", "package main\n"),
            ("pkg/b/b.go", "package b\n"),
            ("pkg/a/a.go", "package a\n"),
            ("pkg/a/testdata/t.go", "package t\n"),
            ("vendor/v/v.go", "package v\n"),
            (".hidden/h.go", "package h\n"),
            ("_skip/s.go", "package s\n"),
            ("nested/go.mod", "module example.com/nested\n"),
            ("nested/n.go", "package n\n"),
            ("docs/README.md", "# docs\n"),
        ]);
        let loader = Loader::new(root.path(), linux())?;
        let packages = loader.load(&["./...".to_string()])?;
        assert_eq!(
            paths(&packages),
            vec!["example.com/m", "example.com/m/pkg/a", "example.com/m/pkg/b"]
        );
        assert_eq!(packages[0].name, "main");
        Ok(())
    }

    #[test]
    fn test_file_selection() -> Result<()> {
        let root = module(&[
            ("p/a.go", "package p\n"),
            ("p/a_test.go", "package p\n"),
            ("p/b_windows.go", "package p\n"),
            ("p/c_linux.go", "package p\n"),
            ("p/gen.go", "//go:build ignore\n\npackage main\n"),
            ("p/d.go", "//go:build linux && amd64\n\npackage p\n"),
            ("p/other.go", "package other\n"),
            ("p/_e.go", "package p\n"),
        ]);
        let loader = Loader::new(root.path(), linux())?;
        let packages = loader.load(&["./p".to_string()])?;
        let files: Vec<_> = packages[0]
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["a.go", "c_linux.go", "d.go"]);
        Ok(())
    }

    #[test]
    fn test_dedup_and_subdirectory_input() -> Result<()> {
        let root = module(&[("pkg/a/a.go", "package a\n"), ("pkg/b/b.go", "package b\n")]);
        let loader = Loader::new(&root.path().join("pkg"), linux())?;
        let packages = loader.load(&[
            "./...".to_string(),
            "./a".to_string(),
            "example.com/m/pkg/b".to_string(),
        ])?;
        assert_eq!(
            paths(&packages),
            vec!["example.com/m/pkg/a", "example.com/m/pkg/b"]
        );
        Ok(())
    }

    #[test]
    fn test_errors() {
        let root = module(&[("pkg/a/a.go", "package a\nfunc (\n")]);
        let loader = Loader::new(root.path(), linux()).unwrap();
        assert!(matches!(
            loader.load(&["./pkg/a".to_string()]),
            Err(GostubError::Parse { .. })
        ));
        assert!(matches!(
            loader.load(&["./missing".to_string()]),
            Err(GostubError::InvalidPattern(_))
        ));

        let empty = module(&[("docs/x.txt", "")]);
        let loader = Loader::new(empty.path(), linux()).unwrap();
        assert!(matches!(
            loader.load(&["./...".to_string()]),
            Err(GostubError::NoPackages(_))
        ));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempdir().unwrap();
        // A go.mod further up would be found, so only check the error shape when there is none.
        if nearest_manifest(dir.path()).is_none() {
            assert!(matches!(
                Loader::new(dir.path(), linux()),
                Err(GostubError::ManifestNotFound(_))
            ));
        }
    }
}
