//! Check for `MaxItems: 1` blocks holding a single property.
//!
//! # Rationale
//!
//! A one-element list wrapping one attribute adds a level of nesting to
//! the configuration for no gain; `foo { bar = 1 }` reads better as
//! `foo_bar = 1`.
//!
//! # Detected Patterns
//!
//! - `Type: TypeList`, `MaxItems: 1`, and an `Elem` block with exactly one
//!   entry
//!
//! # Suppression
//!
//! - A comment on the `Elem:` line explaining why the block is kept
//! - `//lintignore:AZSD001`

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_schema::{local, LocalSchemas, SchemaType};

use crate::report_in;

/// Check code.
pub const CODE: &str = "AZSD001";

/// Flags single-property `MaxItems: 1` blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxItemsOne;

impl MaxItemsOne {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for MaxItemsOne {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for MaxItems: 1 blocks with a single property\n\n\
         Such blocks should be flattened into a scalar attribute, or carry a \
         comment on the Elem line explaining why they are not."
    }

    fn requires(&self) -> &'static [&'static str] {
        &[local::NAME]
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(local) = pass.fact::<LocalSchemas>(local::NAME) else {
            return Ok(None);
        };
        for field in local.maps.iter().flat_map(|m| &m.fields) {
            let info = &field.info;
            if info.schema_type != SchemaType::List || info.max_items != Some(1) || info.elem_comment {
                continue;
            }
            let Some(block) = info.block().filter(|b| b.entry_count() == 1) else {
                continue;
            };
            let suggestion = match block.keys().next() {
                Some((inner, _, _)) => Suggestion::new(format!(
                    "flatten into `{}_{inner}`, or explain the block in a comment on the Elem line",
                    field.name
                )),
                None => Suggestion::new("flatten the block, or explain it in a comment on the Elem line"),
            };
            report_in(
                pass,
                field.file,
                field.key_position,
                format!("`{}` is a MaxItems: 1 block with a single property", field.name),
                Some(suggestion),
            );
        }
        Ok(None)
    }
}
