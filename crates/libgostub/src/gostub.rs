use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{
    constraint::BuildContext,
    emit::Emitter,
    error::{GostubError, Result},
    gomod::MANIFEST,
    imports::{FormatterKind, ImportFormatter},
    loader::{Loader, Package},
    overrides::FunctionBodies,
};

/// Gostub generates stub packages from the packages of a Go module.
///
/// Every exported declaration keeps its signature, function bodies are replaced with
/// `panic("stub")` (or a configured override), and types from imports that are neither standard
/// library, allow-listed, nor part of the generated set are replaced with `interface{}`. The
/// result compiles without the original dependencies.
#[derive(Debug, Clone)]
pub struct Gostub {
    /// Directory the module is discovered from and patterns are resolved against.
    input_dir: PathBuf,

    /// Root under which `<import path>/<package name>.go` files are written.
    output_dir: PathBuf,

    /// Whether to write a `go.mod` at the root of the generated module.
    generate_go_mod: bool,

    /// Third-party import paths kept in the stubs.
    allow_imports: Vec<String>,

    /// Replacement bodies for selected functions and methods.
    bodies: FunctionBodies,

    /// Target used for file selection.
    ctx: BuildContext,

    formatter: FormatterKind,
}

impl Gostub {
    /// Creates a new Gostub reading the module that contains `input_dir`.
    ///
    /// # Patterns
    ///
    /// Patterns are resolved relative to `input_dir`, like the `go` tool does:
    ///
    /// - `./...` every package at or below the input directory
    /// - `.` or `./pkg/types` a single package
    /// - `pkg/...` every package below a relative directory
    /// - `github.com/acme/mod/pkg/...` import-path patterns within the module
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: PathBuf::from("."),
            generate_go_mod: false,
            allow_imports: Vec::new(),
            bodies: FunctionBodies::new(),
            ctx: BuildContext::default(),
            formatter: FormatterKind::default(),
        }
    }

    /// Sets the directory stubs are written under.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Enables or disables writing `<output>/<module path>/go.mod`.
    pub fn with_generate_go_mod(mut self, generate_go_mod: bool) -> Self {
        self.generate_go_mod = generate_go_mod;
        self
    }

    /// Adds third-party import paths whose types survive in the stubs.
    pub fn with_allow_imports(mut self, imports: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allow_imports.extend(imports.into_iter().map(Into::into));
        self
    }

    /// Adds function body overrides; later entries replace earlier ones.
    pub fn with_function_bodies(mut self, bodies: FunctionBodies) -> Self {
        self.bodies.extend(bodies);
        self
    }

    /// Sets the target used to select files.
    pub fn with_build_context(mut self, ctx: BuildContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Sets the formatter applied to each stub.
    pub fn with_formatter(mut self, formatter: FormatterKind) -> Self {
        self.formatter = formatter;
        self
    }

    /// Generates stubs for every package matched by `patterns` and returns the written files.
    ///
    /// Packages are written one at a time in import path order. A failure aborts generation;
    /// files already written stay on disk.
    pub fn generate(&self, patterns: &[String]) -> Result<Vec<PathBuf>> {
        let loader = Loader::new(&self.input_dir, self.ctx.clone())?;
        let mut written = Vec::new();

        if self.generate_go_mod {
            let manifest = &loader.module().manifest;
            let path = self.output_dir.join(&manifest.module).join(MANIFEST);
            write_file(&path, &manifest.render())?;
            info!("wrote {}", path.display());
            written.push(path);
        }

        let packages = loader.load(patterns)?;
        let formatter = self.formatter.build()?;
        let emitter = Emitter::new(&packages, &self.allow_imports, &self.bodies);
        for package in &packages {
            let (path, source) = self.stub_package(&emitter, formatter.as_ref(), package)?;
            write_file(&path, &source)?;
            info!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Renders stubs for every package matched by `patterns` without touching the filesystem.
    ///
    /// Returns `(import path, source)` pairs in import path order.
    pub fn render(&self, patterns: &[String]) -> Result<Vec<(String, String)>> {
        let loader = Loader::new(&self.input_dir, self.ctx.clone())?;
        let packages = loader.load(patterns)?;
        let formatter = self.formatter.build()?;
        let emitter = Emitter::new(&packages, &self.allow_imports, &self.bodies);
        packages
            .iter()
            .map(|package| {
                let (_, source) = self.stub_package(&emitter, formatter.as_ref(), package)?;
                Ok((package.path.clone(), source))
            })
            .collect()
    }

    /// Emit and format one package, returning its output path and final source.
    fn stub_package(
        &self,
        emitter: &Emitter<'_>,
        formatter: &dyn ImportFormatter,
        package: &Package,
    ) -> Result<(PathBuf, String)> {
        let path = self.output_path(package);
        let raw = emitter.emit(package)?;
        debug!("formatting {} with the {} formatter", path.display(), self.formatter);
        let source = formatter.process(&path, &raw)?;
        Ok((path, source))
    }

    /// `<output>/<import path>/<package name>.go`
    pub fn output_path(&self, package: &Package) -> PathBuf {
        self.output_dir
            .join(&package.path)
            .join(format!("{}.go", package.name))
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    let write_error = |source| GostubError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, contents).map_err(write_error)
}
