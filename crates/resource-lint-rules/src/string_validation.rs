//! Check that string attributes declare a validation function.
//!
//! # Rationale
//!
//! Azure rejects most malformed strings only at apply time, after a plan
//! that looked fine. A `ValidateFunc` moves the failure to plan time.
//!
//! # Detected Patterns
//!
//! - A `TypeString` schema with `Required: true` or `Optional: true` and
//!   neither `ValidateFunc` nor `ValidateDiagFunc`
//!
//! Computed-only strings are never flagged. `ValidateFunc: nil` counts as
//! missing.
//!
//! # Suppression
//!
//! - `//lintignore:AZBP001` on the attribute line or the line above

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_schema::{local, LocalSchemas, SchemaInfo, SchemaType};

use crate::{declared, report_in};

/// Check code.
pub const CODE: &str = "AZBP001";

/// Flags settable string attributes without validation.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringValidation;

impl StringValidation {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn needs_validation(info: &SchemaInfo) -> bool {
    info.schema_type == SchemaType::String
        && (info.required || info.optional)
        && !info.has_validation
}

impl Analyzer for StringValidation {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for string attributes without a validation function\n\n\
         Every Required or Optional TypeString attribute must set ValidateFunc \
         (or ValidateDiagFunc) so invalid values fail at plan time."
    }

    fn requires(&self) -> &'static [&'static str] {
        &[local::NAME]
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(local) = pass.fact::<LocalSchemas>(local::NAME) else {
            return Ok(None);
        };
        for schema in declared(local).filter(|d| needs_validation(d.info)) {
            let message = match schema.name {
                Some(name) => format!("string attribute `{name}` must have a ValidateFunc"),
                None => "string schema must have a ValidateFunc".to_owned(),
            };
            let suggestion = Suggestion::new(
                "add `ValidateFunc: validation.StringIsNotEmpty` or a stricter validator",
            );
            report_in(pass, schema.file, schema.position, message, Some(suggestion));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_file;

    #[test]
    fn test_detects_unvalidated_required_string() {
        let violations = check_file(
            CODE,
            r#"package web

func (r WebAppResource) Arguments() map[string]*pluginsdk.Schema {
	return map[string]*pluginsdk.Schema{
		"name": {
			Type:     pluginsdk.TypeString,
			Required: true,
		},
	}
}
"#,
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].analyzer, CODE);
        assert_eq!(violations[0].location.line, 5);
        assert!(violations[0].message.contains("`name`"));
    }

    #[test]
    fn test_allows_validated_and_computed_strings() {
        let violations = check_file(
            CODE,
            r#"package web

func (r WebAppResource) Arguments() map[string]*pluginsdk.Schema {
	return map[string]*pluginsdk.Schema{
		"name": {
			Type:         pluginsdk.TypeString,
			Required:     true,
			ValidateFunc: validation.StringIsNotEmpty,
		},

		"kind": {
			Type:             pluginsdk.TypeString,
			Optional:         true,
			ValidateDiagFunc: validate.Kind,
		},

		"id": {
			Type:     pluginsdk.TypeString,
			Computed: true,
		},

		"count": {
			Type:     pluginsdk.TypeInt,
			Optional: true,
		},
	}
}
"#,
        );
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_nil_validation_counts_as_missing() {
        let violations = check_file(
            CODE,
            r#"package web

func extraSchema() *pluginsdk.Schema {
	return &pluginsdk.Schema{
		Type:         pluginsdk.TypeString,
		Optional:     true,
		ValidateFunc: nil,
	}
}
"#,
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "string schema must have a ValidateFunc");
    }

    #[test]
    fn test_respects_lintignore() {
        let violations = check_file(
            CODE,
            r#"package web

var s = map[string]*pluginsdk.Schema{
	//lintignore:AZBP001
	"name": {
		Type:     pluginsdk.TypeString,
		Required: true,
	},
}
"#,
        );
        assert!(violations.is_empty());
    }
}
