//! Check for `_in_percent` attribute names.
//!
//! # Rationale
//!
//! The provider names percentages `_percentage`; mixing both spellings
//! makes attribute names harder to guess.
//!
//! Keys are checked even when their value is a call that cannot be
//! followed.

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_schema::{local, LocalSchemas};

use crate::report_in;

/// Check code.
pub const CODE: &str = "AZRN001";

const DISCOURAGED: &str = "_in_percent";
const PREFERRED: &str = "_percentage";

/// Flags attribute names containing `_in_percent`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PercentNaming;

impl PercentNaming {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for PercentNaming {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for attribute names using _in_percent\n\n\
         Percentages are named with the `_percentage` suffix."
    }

    fn requires(&self) -> &'static [&'static str] {
        &[local::NAME]
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(local) = pass.fact::<LocalSchemas>(local::NAME) else {
            return Ok(None);
        };
        for (name, file, position) in local.maps.iter().flat_map(|m| m.keys()) {
            if !name.contains(DISCOURAGED) {
                continue;
            }
            let renamed = name.replace(DISCOURAGED, PREFERRED);
            report_in(
                pass,
                file,
                position,
                format!("`{name}` should use `{PREFERRED}` instead of `{DISCOURAGED}`"),
                Some(Suggestion::with_replacement(format!("rename to `{renamed}`"), renamed)),
            );
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_file;

    #[test]
    fn test_detects_in_percent_names() {
        let violations = check_file(
            CODE,
            r#"package web

var s = map[string]*pluginsdk.Schema{
	"cpu_in_percent": {Type: pluginsdk.TypeInt, Optional: true},
	"memory_percentage": {Type: pluginsdk.TypeInt, Optional: true},
	"scale": {
		Type:     pluginsdk.TypeList,
		Optional: true,
		Elem: &pluginsdk.Resource{
			Schema: map[string]*pluginsdk.Schema{
				"threshold_in_percent_max": {Type: pluginsdk.TypeInt, Optional: true},
			},
		},
	},
}
"#,
        );
        let replacements: Vec<_> = violations
            .iter()
            .filter_map(|v| v.suggestion.as_ref()?.replacement.as_deref())
            .collect();
        assert_eq!(
            replacements,
            vec!["cpu_percentage", "threshold_percentage_max"]
        );
    }

    #[test]
    fn test_checks_keys_of_unresolved_entries() {
        let violations = check_file(
            CODE,
            r#"package web

var s = map[string]*pluginsdk.Schema{
	"name":           commonschema.Name(),
	"cpu_in_percent": cpuSchema(),
}
"#,
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 5);
        assert!(violations[0].message.contains("`cpu_in_percent`"));
    }
}
