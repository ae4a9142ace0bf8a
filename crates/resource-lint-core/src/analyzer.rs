//! The analyzer trait and its error type.

use std::any::Any;

use thiserror::Error;

use crate::pass::Pass;
use crate::types::Severity;

/// Result value an analyzer hands to the analyzers that require it.
pub type Fact = Box<dyn Any + Send + Sync>;

/// Errors that can occur while building or running the analyzer graph.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A check or requirement names an analyzer that is not registered.
    #[error("unknown analyzer: {0}")]
    UnknownAnalyzer(String),

    /// The `requires` relation is cyclic.
    #[error("analyzer dependency cycle involving {0}")]
    Cycle(String),

    /// Two registered analyzers share a name.
    #[error("analyzer registered twice: {0}")]
    Duplicate(String),

    /// An analyzer failed on one package.
    #[error("{analyzer} failed on {package}: {message}")]
    Failed {
        /// Analyzer name.
        analyzer: String,
        /// Import path of the package.
        package: String,
        /// Failure description.
        message: String,
    },
}

/// One unit of static analysis.
///
/// Analyzers form a graph through [`requires`](Analyzer::requires). Each
/// runs once per root package, after everything it requires, and may
/// return a [`Fact`] for downstream analyzers and report diagnostics
/// through its [`Pass`].
///
/// # Example
///
/// ```ignore
/// struct PercentNames;
///
/// impl Analyzer for PercentNames {
///     fn name(&self) -> &'static str { "AZRN001" }
///     fn doc(&self) -> &'static str { "check for _in_percent property names" }
///     fn requires(&self) -> &'static [&'static str] { &["schema-local"] }
///
///     fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
///         let Some(local) = pass.fact::<LocalSchemas>("schema-local") else {
///             return Ok(None);
///         };
///         // ...
///         Ok(None)
///     }
/// }
/// ```
pub trait Analyzer: Send + Sync {
    /// Graph key, and the name printed with each diagnostic.
    fn name(&self) -> &'static str;

    /// Documentation; the first line is the title shown by `--list`.
    fn doc(&self) -> &'static str;

    /// Names of the analyzers whose facts this one consumes.
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether this analyzer reports diagnostics. Extraction layers that
    /// only produce facts return `false` and are hidden from `--list`.
    fn reports(&self) -> bool {
        true
    }

    /// Severity of reported diagnostics unless configuration overrides it.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Analyzes the package of `pass`.
    ///
    /// # Errors
    ///
    /// An error drops this analyzer's fact for the package; dependents then
    /// report nothing for it. The run itself continues.
    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError>;
}

/// Type alias for boxed Analyzer trait objects.
pub type AnalyzerBox = Box<dyn Analyzer>;

/// First line of an analyzer's documentation.
#[must_use]
pub fn title(analyzer: &dyn Analyzer) -> &'static str {
    analyzer.doc().lines().next().unwrap_or_default().trim()
}
