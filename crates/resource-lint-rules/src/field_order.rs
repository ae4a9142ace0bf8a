//! Check the declaration order of schema fields in new files.
//!
//! # Rationale
//!
//! A fixed order makes schemas comparable at a glance and keeps the
//! generated documentation stable.
//!
//! # Expected Order
//!
//! Top-level maps:
//!
//! 1. `name`, `resource_group_name`, `location`, each only when required
//! 2. the remaining required fields, in declaration order
//! 3. optional fields, sorted
//! 4. computed-only fields, sorted
//!
//! Nested maps (under `Elem`): required, optional and computed-only groups,
//! each sorted.
//!
//! Only files created by the change set are checked. Maps with entries
//! that could not be resolved are skipped.

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_schema::{complete, CompleteSchemas, SchemaMap};
use tracing::debug;

use crate::report_in;

/// Check code.
pub const CODE: &str = "AZNR001";

/// Identity fields leading a top-level schema, in this order.
const IDENTITY_FIELDS: &[&str] = &["name", "resource_group_name", "location"];

/// Flags schema maps whose fields are out of order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldOrder;

impl FieldOrder {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Field names of `map` in the order they are expected to be declared.
///
/// Fields that are neither required, optional nor computed are left out,
/// so the result can be shorter than the map.
#[must_use]
pub fn expected_order(map: &SchemaMap) -> Vec<&str> {
    let mut required = Vec::new();
    let mut optional = Vec::new();
    let mut computed = Vec::new();
    for field in &map.fields {
        let name = field.name.as_str();
        if field.info.required {
            required.push(name);
        } else if field.info.optional {
            optional.push(name);
        } else if field.info.is_computed_only() {
            computed.push(name);
        }
    }
    optional.sort_unstable();
    computed.sort_unstable();

    let mut out = Vec::with_capacity(map.fields.len());
    if map.nested {
        required.sort_unstable();
    } else {
        for identity in IDENTITY_FIELDS {
            if let Some(i) = required.iter().position(|name| name == identity) {
                out.push(required.remove(i));
            }
        }
    }
    out.extend(required);
    out.extend(optional);
    out.extend(computed);
    out
}

impl Analyzer for FieldOrder {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for schema fields out of the conventional order\n\n\
         Top-level schemas list name, resource_group_name and location first, then \
         required, optional and computed fields; nested schemas sort each group."
    }

    fn requires(&self) -> &'static [&'static str] {
        &[complete::NAME]
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(schemas) = pass.fact::<CompleteSchemas>(complete::NAME) else {
            return Ok(None);
        };
        for map in schemas.maps() {
            let Some(file) = pass.package().file(map.id.file) else {
                continue;
            };
            if !pass.is_new_file(file) {
                continue;
            }
            if !map.is_complete() {
                debug!(
                    "{}:{}: schema map not fully resolved, order not checked",
                    file.display_path().display(),
                    map.position.line
                );
                continue;
            }
            let expected = expected_order(map);
            if expected.len() != map.fields.len() {
                continue;
            }
            let actual: Vec<&str> = map.names().collect();
            let Some(first) = actual.iter().zip(&expected).position(|(a, e)| a != e) else {
                continue;
            };
            report_in(
                pass,
                map.id.file,
                map.position,
                format!(
                    "schema fields are out of order: expected `{}` at position {}, found `{}`",
                    expected[first],
                    first + 1,
                    actual[first]
                ),
                Some(Suggestion::new(format!("order the fields as: {}", expected.join(", ")))),
            );
        }
        Ok(None)
    }
}
