//! Assembles the stub source of a whole package.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::ast::{Decl, Import, TypeSpec};
use crate::error::Result;
use crate::format::{EMBED_SENTINEL, ImportAllowSet, OPAQUE_TYPE};
use crate::loader::{Package, PackageFile};
use crate::overrides::FunctionBodies;
use crate::stub::Stubber;

/// File-scope type declarations of each file of a package, ordered by name.
#[derive(Debug, Default)]
pub struct SymbolIndex<'p> {
    files: Vec<BTreeMap<&'p str, &'p TypeSpec>>,
}

impl<'p> SymbolIndex<'p> {
    /// Index the type declarations of `files`, keeping their order.
    pub fn build(files: &[&'p PackageFile]) -> Self {
        let files = files
            .iter()
            .map(|&file| {
                file.syntax
                    .decls
                    .iter()
                    .filter_map(|decl| match decl {
                        Decl::Type(specs) => Some(specs),
                        _ => None,
                    })
                    .flatten()
                    .map(|spec| (spec.name.as_str(), spec))
                    .collect()
            })
            .collect();
        Self { files }
    }

    /// Type declarations of the `index`-th file, by name.
    pub fn types(&self, index: usize) -> impl Iterator<Item = &'p TypeSpec> + '_ {
        self.files.get(index).into_iter().flat_map(|types| types.values().copied())
    }
}

/// Renders packages, deciding which imports a stub may keep.
pub struct Emitter<'a> {
    allow_imports: &'a [String],
    /// Import paths of every package being generated.
    local_paths: HashSet<&'a str>,
    bodies: &'a FunctionBodies,
}

impl<'a> Emitter<'a> {
    /// An emitter for one run over `packages`; their import paths count as local.
    pub fn new(
        packages: &'a [Package],
        allow_imports: &'a [String],
        bodies: &'a FunctionBodies,
    ) -> Self {
        Self {
            allow_imports,
            local_paths: packages.iter().map(|p| p.path.as_str()).collect(),
            bodies,
        }
    }

    /// Standard-library imports and imports of generated packages are always kept; anything
    /// else only when allow-listed. Paths containing a dot are considered third-party, as is cgo.
    pub fn keeps_import(&self, path: &str) -> bool {
        let third_party = path.contains('.') || path == "C";
        !third_party
            || self.allow_imports.iter().any(|allowed| allowed == path)
            || self.local_paths.contains(path)
    }

    /// Render the unformatted stub source of `package`.
    pub fn emit(&self, package: &Package) -> Result<String> {
        debug!("generating stubs for package {}", package.path);
        let files: Vec<&PackageFile> = package
            .files
            .iter()
            .filter(|file| {
                if file.syntax.generated {
                    debug!("skipping generated file {}", file.path.display());
                }
                !file.syntax.generated
            })
            .collect();

        let mut out = format!("package {}\n\n", package.name);
        let mut allowed = ImportAllowSet::new();
        let mut seen = HashSet::new();
        for import in files.iter().flat_map(|file| &file.syntax.imports) {
            if !self.keeps_import(&import.path) || !seen.insert(dedup_key(import)) {
                continue;
            }
            match &import.alias {
                Some(alias) => out.push_str(&format!("import {alias} \"{}\"\n\n", import.path)),
                None => out.push_str(&format!("import \"{}\"\n\n", import.path)),
            }
            if let Some(name) = import.bound_name() {
                allowed.insert(name);
            }
        }

        let index = SymbolIndex::build(&files);
        let stubber = Stubber::new(&package.name, &allowed, self.bodies);
        for (i, file) in files.iter().enumerate() {
            stubber.stub_values(&file.syntax, &mut out);
            stubber.stub_types(index.types(i), &mut out);
            stubber.stub_functions(&file.syntax, &mut out)?;
        }

        out.push_str(&format!("type {EMBED_SENTINEL} {OPAQUE_TYPE}\n\n"));
        Ok(out)
    }
}

/// Imports are deduplicated by the name they bind, the same name the allow-set holds. Blank
/// and dot imports bind nothing, so they are keyed by path.
fn dedup_key(import: &Import) -> String {
    match import.bound_name() {
        Some(name) => name,
        None => format!("{} {}", import.alias.as_deref().unwrap_or(""), import.path),
    }
}
