//! # resource-lint-go
//!
//! Tree-sitter based Go package model for resource-lint.
//!
//! This crate stands in for a Go compiler front end. It parses Go sources
//! with `tree-sitter-go` and offers just enough symbol resolution for the
//! provider's conventions to be checked:
//!
//! - [`GoFile`] for one parsed source file (imports, comments, node helpers)
//! - [`GoPackage`] for the files of one directory sharing a package clause
//! - [`GoModule`] for `go.mod` discovery and import path to directory mapping
//! - [`PackageLoader`] for pattern expansion and transitive import loading
//! - [`PackageRegistry`] for cross-package lookups during analysis
//! - [`NodeRef`] as the opaque handle analyzers pass between each other

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod file;
pub mod loader;
pub mod module;
pub mod package;
pub mod registry;

pub use ast::{Entry, Walk};
pub use error::LoadError;
pub use file::{Comment, FileKey, GoFile, ImportSpec, NodeRef, Position};
pub use loader::{LoadOutcome, PackageLoader};
pub use module::GoModule;
pub use package::GoPackage;
pub use registry::PackageRegistry;
pub use tree_sitter::Node;
