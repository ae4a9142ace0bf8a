//! Run-wide context shared by every pass.

use resource_lint_changes::ChangeSet;
use resource_lint_go::{GoModule, PackageRegistry};

use crate::config::Config;

/// Everything a run knows before the first analyzer starts.
///
/// Built once by the runner, read-only afterwards, and handed to every
/// pass by reference.
#[derive(Debug, Default)]
pub struct LintContext {
    /// All loaded packages: roots and their dependencies.
    pub registry: PackageRegistry,
    /// Lines to report on; `None` reports everything.
    pub changes: Option<ChangeSet>,
    /// Resolved configuration.
    pub config: Config,
    /// The main module, when analyzing from disk.
    pub module: Option<GoModule>,
}

impl LintContext {
    /// Creates a context around a populated registry.
    #[must_use]
    pub fn new(registry: PackageRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Sets the change set.
    #[must_use]
    pub fn with_changes(mut self, changes: Option<ChangeSet>) -> Self {
        self.changes = changes;
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the main module.
    #[must_use]
    pub fn with_module(mut self, module: GoModule) -> Self {
        self.module = Some(module);
        self
    }
}
