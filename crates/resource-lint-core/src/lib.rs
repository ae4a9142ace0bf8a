//! # resource-lint-core
//!
//! Core framework for resource-lint's analyzer graph.
//!
//! This crate provides the foundational traits and types the checks are
//! built from:
//!
//! - [`Analyzer`] trait for one unit of analysis with declared requirements
//! - [`Pass`] for the per-package view an analyzer runs against
//! - [`AnalyzerGraph`] for ordering and executing analyzers
//! - [`LintContext`] for run-wide state (packages, change set, config)
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use resource_lint_core::{AnalyzerGraph, LintContext};
//!
//! let graph = AnalyzerGraph::build(all_analyzers(), &[])?;
//! let ctx = LintContext::new(outcome.registry).with_changes(changes);
//! let result = graph.run(&ctx, &outcome.roots);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod graph;
mod pass;
mod types;

/// Utility modules for analyzer implementations.
pub mod utils;

pub use analyzer::{title, AnalysisError, Analyzer, AnalyzerBox, Fact};
pub use config::{AnalyzerConfig, ChangesConfig, Config, ConfigError, RuleConfig};
pub use context::LintContext;
pub use graph::AnalyzerGraph;
pub use pass::{FactStore, Pass};
pub use types::{LintResult, Location, Severity, Suggestion, Violation};
pub use utils::lintignore::IgnoreCheck;
