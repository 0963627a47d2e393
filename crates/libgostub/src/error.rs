use std::path::PathBuf;
use thiserror::Error;

use crate::parser::SyntaxError;

/// Errors raised while loading, stubbing or writing packages.
#[derive(Error, Debug)]
pub enum GostubError {
    /// No `go.mod` above the input directory.
    #[error("Failed to find go.mod in {0} or any parent directories")]
    ManifestNotFound(PathBuf),

    /// A `go.mod` without a usable `module` directive.
    #[error("Failed to parse {path}: {message}")]
    ManifestParse {
        /// Manifest path.
        path: PathBuf,
        /// What was wrong.
        message: String,
    },

    /// The patterns matched no package.
    #[error("No packages found in {0}")]
    NoPackages(String),

    /// A pattern that cannot be resolved inside the module.
    #[error("Invalid package pattern: {0}")]
    InvalidPattern(String),

    /// A function body key that is not `pkg.Func` or a method form.
    #[error("Invalid function body key: {0}")]
    InvalidOverrideKey(String),

    /// An unreadable or malformed config file.
    #[error("Invalid config file {path}: {message}")]
    Config {
        /// Config file path.
        path: PathBuf,
        /// What was wrong.
        message: String,
    },

    /// A method receiver list that is not exactly one named or unnamed receiver.
    #[error("Malformed receiver for {package}.{function}: {message}")]
    MalformedReceiver {
        /// Package name.
        package: String,
        /// Method name.
        function: String,
        /// What was wrong.
        message: String,
    },

    /// A Go source file that does not parse.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Source file path.
        path: PathBuf,
        /// Position and message.
        #[source]
        source: SyntaxError,
    },

    /// I/O failure while reading input.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// I/O failure while writing output.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The import formatter rejected a generated file.
    #[error("Formatting {path} failed: {message}")]
    Format {
        /// Output path.
        path: PathBuf,
        /// Formatter diagnostics.
        message: String,
    },

    /// Unknown formatter name, or its binary is missing.
    #[error("Formatter binary not found: {0}")]
    FormatterNotFound(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GostubError>;
