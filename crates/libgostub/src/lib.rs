//! Generate stub packages from Go source.
//!
//! A stub package keeps the exported API of a Go package (types, functions, methods, constants
//! and variables) while replacing every function body with `panic("stub")` and every type that
//! comes from a disallowed third-party import with `interface{}`. Stubs compile on their own, so
//! code depending on a heavy package can be built and tested against the stub instead.
//!
//! [`Gostub`] drives the whole pipeline: load packages from a Go module, emit stubs, format them
//! and write them to disk.

pub mod ast;
mod config;
mod constraint;
mod emit;
mod error;
mod format;
mod gomod;
mod gostub;
mod imports;
mod keywords;
mod lexer;
mod loader;
mod overrides;
mod parser;
mod pattern;
mod printer;
mod stub;

pub use crate::{
    config::{Config, DEFAULT_CONFIG},
    constraint::BuildContext,
    emit::Emitter,
    error::{GostubError, Result},
    format::{EMBED_SENTINEL, ImportAllowSet, OPAQUE_TYPE, TypeFormatter},
    gomod::GoMod,
    gostub::Gostub,
    imports::{FormatterKind, GoImports, ImportFormatter, NativeImports},
    loader::{Loader, Module, Package, PackageFile},
    overrides::{FunctionBodies, OverrideKey},
    parser::{SyntaxError, parse_file},
    stub::{DEFAULT_BODY, Stubber},
};
