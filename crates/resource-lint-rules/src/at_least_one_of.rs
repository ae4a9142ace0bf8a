//! Check that optional-only blocks declare `AtLeastOneOf`.
//!
//! # Rationale
//!
//! A block whose properties are all optional accepts `foo {}`, which the
//! API usually treats differently from omitting the block. `AtLeastOneOf`
//! on the properties rejects the empty block at plan time.
//!
//! # Detected Patterns
//!
//! - A non-computed `TypeList` whose `Elem` block is fully resolved, has no
//!   required property, at least two optional ones, and no `AtLeastOneOf`

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_schema::{local, LocalSchemas, SchemaInfo, SchemaType};

use crate::report_in;

/// Check code.
pub const CODE: &str = "AZSD002";

/// Flags optional-only blocks without `AtLeastOneOf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtLeastOneOf;

impl AtLeastOneOf {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Optional property names of the block, when it needs `AtLeastOneOf`.
fn candidates(info: &SchemaInfo) -> Option<Vec<&str>> {
    if info.computed || info.schema_type != SchemaType::List {
        return None;
    }
    let block = info.block().filter(|b| b.is_complete())?;
    if block.fields.iter().any(|f| f.info.required || f.info.at_least_one_of) {
        return None;
    }
    let optional: Vec<&str> = block
        .fields
        .iter()
        .filter(|f| f.info.optional)
        .map(|f| f.name.as_str())
        .collect();
    (optional.len() >= 2).then_some(optional)
}

impl Analyzer for AtLeastOneOf {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for optional-only blocks without AtLeastOneOf\n\n\
         When every property of a list block is optional, the properties should \
         declare AtLeastOneOf so an empty block is rejected."
    }

    fn requires(&self) -> &'static [&'static str] {
        &[local::NAME]
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(local) = pass.fact::<LocalSchemas>(local::NAME) else {
            return Ok(None);
        };
        for field in local.maps.iter().flat_map(|m| &m.fields) {
            let Some(optional) = candidates(&field.info) else {
                continue;
            };
            let paths: Vec<String> = optional
                .iter()
                .map(|name| format!("\"{}.0.{name}\"", field.name))
                .collect();
            report_in(
                pass,
                field.file,
                field.key_position,
                format!(
                    "block `{}` has only optional properties and none sets AtLeastOneOf",
                    field.name
                ),
                Some(Suggestion::new(format!(
                    "add `AtLeastOneOf: []string{{{}}}` to each property",
                    paths.join(", ")
                ))),
            );
        }
        Ok(None)
    }
}
