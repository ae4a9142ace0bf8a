//! Check Optional+Computed attributes.
//!
//! # Rationale
//!
//! An attribute that is both Optional and Computed hides drift: removing it
//! from the configuration silently keeps the remote value. Each one needs a
//! written justification, and a fixed layout keeps those easy to audit.
//!
//! # Detected Patterns
//!
//! - `Computed: true` written before `Optional: true`
//! - No comment containing `NOTE: O+C` between `Optional` and `Computed`
//!
//! ```go
//! "etag": {
//!     Type:     pluginsdk.TypeString,
//!     Optional: true,
//!     // NOTE: O+C - the service generates one when omitted
//!     Computed: true,
//! },
//! ```

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_schema::resolve::OC_NOTE;
use resource_lint_schema::{local, LocalSchemas, SchemaInfo};

use crate::{declared, report_in};

/// Check code.
pub const CODE: &str = "AZBP002";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Problem {
    ComputedFirst,
    MissingNote,
}

fn problem(info: &SchemaInfo) -> Option<Problem> {
    if !(info.optional && info.computed) {
        return None;
    }
    let (optional, computed) = (info.optional_at?, info.computed_at?);
    if computed.offset < optional.offset {
        Some(Problem::ComputedFirst)
    } else if !info.oc_note {
        Some(Problem::MissingNote)
    } else {
        None
    }
}

/// Flags Optional+Computed attributes that are out of order or undocumented.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionalComputed;

impl OptionalComputed {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for OptionalComputed {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for Optional+Computed attributes without a NOTE: O+C comment\n\n\
         Optional must be declared before Computed, with a `// NOTE: O+C` \
         comment between the two explaining why the attribute is computed."
    }

    fn requires(&self) -> &'static [&'static str] {
        &[local::NAME]
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(local) = pass.fact::<LocalSchemas>(local::NAME) else {
            return Ok(None);
        };
        for schema in declared(local) {
            let Some(problem) = problem(schema.info) else {
                continue;
            };
            let subject = schema
                .name
                .map_or_else(|| "schema".to_owned(), |name| format!("`{name}`"));
            let (message, suggestion) = match problem {
                Problem::ComputedFirst => (
                    format!("{subject}: Optional must be declared before Computed"),
                    Suggestion::new("move `Optional: true` above `Computed: true`"),
                ),
                Problem::MissingNote => (
                    format!("{subject} is Optional+Computed without a `// {OC_NOTE}` comment"),
                    Suggestion::new(format!(
                        "add `// {OC_NOTE} - <reason>` between Optional and Computed"
                    )),
                ),
            };
            report_in(pass, schema.file, schema.position, message, Some(suggestion));
        }
        Ok(None)
    }
}
