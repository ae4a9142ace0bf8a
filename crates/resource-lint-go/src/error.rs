//! Errors raised while locating, reading and parsing Go packages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading Go packages.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file or directory.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The tree-sitter grammar could not be installed into the parser.
    #[error("failed to initialise the Go parser: {0}")]
    Language(String),

    /// The source contains syntax errors.
    #[error("{path}:{line}:{column}: syntax error")]
    Syntax {
        /// File containing the error.
        path: PathBuf,
        /// Line of the first error node (1-indexed).
        line: usize,
        /// Column of the first error node (1-indexed).
        column: usize,
    },

    /// A file has no package clause.
    #[error("{path}: missing package clause")]
    MissingPackageClause {
        /// File without a package clause.
        path: PathBuf,
    },

    /// Files in one directory declare different packages.
    #[error("{dir}: found packages {first} and {second}")]
    MixedPackages {
        /// Directory holding the files.
        dir: PathBuf,
        /// First package name seen.
        first: String,
        /// Conflicting package name.
        second: String,
    },

    /// No `go.mod` was found above the working directory.
    #[error("no go.mod found in {0} or any parent directory")]
    NoModule(PathBuf),

    /// The `go.mod` file has no `module` directive.
    #[error("{0}: missing module directive")]
    MissingModuleDirective(PathBuf),

    /// A pattern did not match any package.
    #[error("pattern {0} matched no packages")]
    NoPackages(String),

    /// A pattern names a directory or import path outside the main module.
    #[error("pattern {0} is outside the main module")]
    OutsideModule(String),

    /// Invalid exclude glob pattern.
    #[error("invalid exclude pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Error while walking a directory tree.
    #[error("failed to walk {path}: {message}")]
    Walk {
        /// Root of the walk.
        path: PathBuf,
        /// Walker error message.
        message: String,
    },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
