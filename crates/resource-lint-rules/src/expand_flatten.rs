//! Check for expand/flatten helpers declared in typed resource files.
//!
//! # Rationale
//!
//! Package-level `expand*` and `flatten*` helpers are shared between the
//! resource and its data source. Keeping them next to one resource's
//! `Arguments()` hides them from the other users; they belong in a
//! separate file, or on the resource as methods.
//!
//! # Detected Patterns
//!
//! - A function (not a method) named `expand...` or `flatten...` in a file
//!   that declares a typed resource's `Arguments()`
//!
//! # Suppression
//!
//! - `//lintignore:AZNR003` above the function

use std::collections::BTreeMap;

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_go::ast;
use resource_lint_go::package::decl_name;
use resource_lint_go::FileKey;
use resource_lint_schema::{typed, TypedResources};

/// Check code.
pub const CODE: &str = "AZNR003";

const PREFIXES: &[&str] = &["expand", "flatten"];

/// Flags package-level expand/flatten helpers in typed resource files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpandFlattenPlacement;

impl ExpandFlattenPlacement {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for ExpandFlattenPlacement {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for expand/flatten functions in typed resource files\n\n\
         Package-level expand* and flatten* helpers must not live in the file \
         declaring a typed resource's Arguments()."
    }

    fn requires(&self) -> &'static [&'static str] {
        &[typed::NAME]
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(typed) = pass.fact::<TypedResources>(typed::NAME) else {
            return Ok(None);
        };
        let mut files: BTreeMap<FileKey, &str> = BTreeMap::new();
        for resource in &typed.resources {
            if let Some(arguments) = resource.arguments {
                files.entry(arguments.file).or_insert(&resource.resource_type);
            }
        }

        for (key, resource_type) in files {
            let Some(file) = pass.package().file(key) else {
                continue;
            };
            for decl in ast::named_children(file.root()) {
                if decl.kind() != "function_declaration" {
                    continue;
                }
                let Some(name) = decl_name(file, decl) else {
                    continue;
                };
                if !PREFIXES.iter().any(|p| name.starts_with(p)) {
                    continue;
                }
                pass.report_with_suggestion(
                    file,
                    decl,
                    format!("`{name}` is declared in the file defining {resource_type}"),
                    Suggestion::new(format!(
                        "move `{name}` to a separate file, or make it a method on {resource_type}"
                    )),
                );
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check;

    const RESOURCE: &str = r#"package web

var _ sdk.Resource = WebAppResource{}

type WebAppResource struct{}

func (r WebAppResource) Arguments() map[string]*pluginsdk.Schema {
	return map[string]*pluginsdk.Schema{}
}

func (r WebAppResource) expandSiteConfig(input []SiteConfig) *webapps.SiteConfig {
	return nil
}

func expandSiteConfig(input []SiteConfig) *webapps.SiteConfig {
	return nil
}

//lintignore:AZNR003
func flattenSiteConfig(input *webapps.SiteConfig) []SiteConfig {
	return nil
}

func flattenIdentity(input *identity.SystemAssigned) []interface{} {
	return nil
}

func validateName(input string) bool {
	return true
}
"#;

    const HELPERS: &str = r#"package web

func expandTags(input map[string]string) *map[string]string {
	return &input
}
"#;

    #[test]
    fn test_detects_helpers_in_resource_file() {
        let violations = check(
            CODE,
            &[("web_app_resource.go", RESOURCE), ("helpers.go", HELPERS)],
        );
        let lines: Vec<usize> = violations.iter().map(|v| v.location.line).collect();
        assert_eq!(lines, vec![15, 24]);
        assert!(violations[0].message.contains("`expandSiteConfig`"));
        assert!(violations[0].message.contains("WebAppResource"));
    }

    #[test]
    fn test_ignores_files_without_typed_resources() {
        assert!(check(CODE, &[("helpers.go", HELPERS)]).is_empty());
    }
}
