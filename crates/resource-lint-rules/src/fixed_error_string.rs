//! Check for `fmt.Errorf` without formatting.
//!
//! # Rationale
//!
//! `fmt.Errorf("message")` formats nothing; `errors.New` says so, and a
//! stray `%` in a later edit cannot turn into a formatting bug.

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_go::ast::{self, Walk};
use resource_lint_go::{GoFile, Node, PackageRegistry};

/// Check code.
pub const CODE: &str = "AZRE001";

/// Flags `fmt.Errorf` calls whose only argument is a verb-free literal.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedErrorString;

impl FixedErrorString {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_fixed_errorf<'t>(registry: &PackageRegistry, file: &'t GoFile, call: Node<'t>) -> Option<Node<'t>> {
    let (function, args) = ast::call_parts(call)?;
    let (package, name) = ast::selector_parts(function)?;
    if package.kind() != "identifier"
        || file.text(name) != "Errorf"
        || registry.resolve_import(file, file.text(package)) != Some("fmt")
    {
        return None;
    }
    let [message] = args.as_slice() else {
        return None;
    };
    (ast::is_string_literal(*message) && !file.text(*message).contains('%')).then_some(*message)
}

impl Analyzer for FixedErrorString {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for fmt.Errorf calls without format verbs\n\n\
         `fmt.Errorf(\"text\")` should be `errors.New(\"text\")`."
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let registry = pass.registry();
        for file in pass.package().files().iter().filter(|f| !f.is_test()) {
            let mut found = Vec::new();
            ast::walk(file.root(), |node| {
                if let Some(message) = is_fixed_errorf(registry, file, node) {
                    found.push((node, message));
                }
                Walk::Continue
            });
            for (call, message) in found {
                let replacement = format!("errors.New({})", file.text(message));
                pass.report_with_suggestion(
                    file,
                    call,
                    "fmt.Errorf called without format verbs, use errors.New",
                    Suggestion::with_replacement("use errors.New", replacement),
                );
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_file;

    fn check_code(body: &str) -> Vec<resource_lint_core::Violation> {
        check_file(
            CODE,
            &format!("package web\n\nimport \"fmt\"\n\nfunc f(err error) error {{\n{body}\n}}\n"),
        )
    }

    #[test]
    fn test_detects_constant_message() {
        let violations = check_code("\treturn fmt.Errorf(\"failed\")");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 6);
        let suggestion = violations[0].suggestion.as_ref().expect("suggestion");
        assert_eq!(suggestion.replacement.as_deref(), Some("errors.New(\"failed\")"));
    }

    #[test]
    fn test_allows_format_verbs() {
        assert!(check_code("\treturn fmt.Errorf(\"failed: %v\", err)").is_empty());
        assert!(check_code("\treturn fmt.Errorf(\"100%% done\")").is_empty());
    }

    #[test]
    fn test_allows_non_literal_and_other_packages() {
        assert!(check_code("\tmsg := \"failed\"\n\treturn fmt.Errorf(msg)").is_empty());
        assert!(check_code("\treturn errs.Errorf(\"failed\")").is_empty());
    }
}
