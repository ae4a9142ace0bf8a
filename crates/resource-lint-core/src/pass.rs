//! The per-analyzer, per-package view handed to [`Analyzer::run`].
//!
//! [`Analyzer::run`]: crate::Analyzer::run

use std::collections::HashMap;

use resource_lint_changes::ChangeSet;
use resource_lint_go::{GoFile, GoPackage, Node, PackageRegistry, Position};
use tracing::debug;

use crate::analyzer::Fact;
use crate::context::LintContext;
use crate::types::{Location, Severity, Suggestion, Violation};
use crate::utils::lintignore::check_ignore;

/// Facts produced so far for one package, keyed by analyzer name.
pub type FactStore = HashMap<&'static str, Fact>;

/// One analyzer's view of one package.
pub struct Pass<'a> {
    analyzer: &'static str,
    severity: Severity,
    emit: bool,
    package: &'a GoPackage,
    ctx: &'a LintContext,
    facts: &'a FactStore,
    violations: Vec<Violation>,
}

impl<'a> Pass<'a> {
    /// Creates a pass. `emit` is false for analyzers that run only because
    /// another analyzer requires them.
    #[must_use]
    pub fn new(
        analyzer: &'static str,
        severity: Severity,
        emit: bool,
        package: &'a GoPackage,
        ctx: &'a LintContext,
        facts: &'a FactStore,
    ) -> Self {
        Self {
            analyzer,
            severity,
            emit,
            package,
            ctx,
            facts,
            violations: Vec::new(),
        }
    }

    /// Name of the running analyzer.
    #[must_use]
    pub fn analyzer(&self) -> &'static str {
        self.analyzer
    }

    /// The package under analysis.
    #[must_use]
    pub fn package(&self) -> &'a GoPackage {
        self.package
    }

    /// Every loaded package.
    #[must_use]
    pub fn registry(&self) -> &'a PackageRegistry {
        &self.ctx.registry
    }

    /// The run context.
    #[must_use]
    pub fn context(&self) -> &'a LintContext {
        self.ctx
    }

    /// The change set, if filtering is active.
    #[must_use]
    pub fn changes(&self) -> Option<&'a ChangeSet> {
        self.ctx.changes.as_ref()
    }

    /// Whether `file` was created by the change set (always true without one).
    #[must_use]
    pub fn is_new_file(&self, file: &GoFile) -> bool {
        resource_lint_changes::is_new_file(self.changes(), file.path())
    }

    /// Fact of a required analyzer, or `None` when it produced none.
    #[must_use]
    pub fn fact<T: 'static>(&self, analyzer: &str) -> Option<&'a T> {
        self.facts.get(analyzer)?.downcast_ref::<T>()
    }

    /// Reports a diagnostic at the start of `node`.
    pub fn report(&mut self, file: &GoFile, node: Node<'_>, message: impl Into<String>) {
        self.report_at(file, file.position(node), message, None);
    }

    /// Reports a diagnostic with a suggested fix.
    pub fn report_with_suggestion(
        &mut self,
        file: &GoFile,
        node: Node<'_>,
        message: impl Into<String>,
        suggestion: Suggestion,
    ) {
        self.report_at(file, file.position(node), message, Some(suggestion));
    }

    /// Reports a diagnostic at an explicit position.
    ///
    /// The diagnostic is dropped when the line is outside the change set,
    /// when a `//lintignore` directive covers it, or when the analyzer is
    /// not meant to emit.
    pub fn report_at(
        &mut self,
        file: &GoFile,
        position: Position,
        message: impl Into<String>,
        suggestion: Option<Suggestion>,
    ) {
        if !self.emit {
            return;
        }
        if !resource_lint_changes::should_report(self.changes(), file.path(), position.line) {
            return;
        }
        let ignore = check_ignore(file, position.line, self.analyzer);
        if ignore.is_ignored() {
            debug!(
                "{} suppressed at {}:{} ({})",
                self.analyzer,
                file.display_path().display(),
                position.line,
                ignore.reason().unwrap_or("no reason")
            );
            return;
        }

        let mut violation = Violation::new(
            self.analyzer,
            self.severity,
            Location::new(file.display_path(), position.line, position.column),
            message,
        );
        violation.suggestion = suggestion;
        self.violations.push(violation);
    }

    /// Consumes the pass, returning what it reported.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}
