//! Check for hand-written nil-checked dereferences.
//!
//! # Rationale
//!
//! `pointer.From` returns the pointed-to value or the zero value in one
//! expression. The four-line form it replaces is easy to get subtly wrong.
//!
//! # Detected Patterns
//!
//! ```go
//! v := ""
//! if props.Name != nil {
//!     v = *props.Name
//! }
//! ```
//!
//! The declaration may also be `var v T`. The `if` must have no
//! initializer, no `else`, and a body of exactly `v = *X` for the same `X`
//! the condition compares with `nil`.

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_go::ast::{self, Walk};
use resource_lint_go::{GoFile, Node};

/// Check code.
pub const CODE: &str = "AZBP004";

/// Flags zero-initialised variables assigned from a nil-checked pointer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerFrom;

impl PointerFrom {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

struct Finding<'t> {
    declaration: Node<'t>,
    variable: &'t str,
    pointer: &'t str,
}

/// Statement sequences of `file`: statement lists, and blocks whose
/// statements are not wrapped in one.
fn sequences<'t>(file: &'t GoFile) -> Vec<Vec<Node<'t>>> {
    let mut out = Vec::new();
    ast::walk(file.root(), |node| {
        match node.kind() {
            "statement_list" => out.push(ast::named_children(node)),
            "block" => {
                let children = ast::named_children(node);
                if !children.iter().any(|c| c.kind() == "statement_list") {
                    out.push(children);
                }
            }
            _ => {}
        }
        Walk::Continue
    });
    out
}

fn find(file: &GoFile) -> Vec<Finding<'_>> {
    sequences(file)
        .into_iter()
        .flat_map(|statements| {
            statements
                .windows(2)
                .filter_map(|pair| match_pair(file, pair[0], pair[1]))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn match_pair<'t>(file: &'t GoFile, declaration: Node<'t>, check: Node<'t>) -> Option<Finding<'t>> {
    let variable = zero_declaration(file, declaration)?;

    if check.kind() != "if_statement"
        || check.child_by_field_name("initializer").is_some()
        || check.child_by_field_name("alternative").is_some()
    {
        return None;
    }
    let pointer = nil_checked(file, check.child_by_field_name("condition")?)?;

    let body = ast::block_statements(check.child_by_field_name("consequence")?);
    let [assignment] = body.as_slice() else {
        return None;
    };
    if assignment.kind() != "assignment_statement"
        || assignment
            .child_by_field_name("operator")
            .map(|op| file.text(op))
            != Some("=")
    {
        return None;
    }
    let left = ast::expressions(assignment.child_by_field_name("left")?);
    let right = ast::expressions(assignment.child_by_field_name("right")?);
    let ([target], [value]) = (left.as_slice(), right.as_slice()) else {
        return None;
    };
    if file.text(*target) != variable || value.kind() != "unary_expression" {
        return None;
    }
    let is_deref = value
        .child_by_field_name("operator")
        .is_some_and(|op| file.text(op) == "*");
    let operand = value.child_by_field_name("operand")?;
    (is_deref && file.text(operand) == pointer).then_some(Finding {
        declaration,
        variable,
        pointer,
    })
}

/// `v := <zero>` or `var v T`, returning `v`.
fn zero_declaration<'t>(file: &'t GoFile, node: Node<'t>) -> Option<&'t str> {
    match node.kind() {
        "short_var_declaration" => {
            let left = ast::expressions(node.child_by_field_name("left")?);
            let right = ast::expressions(node.child_by_field_name("right")?);
            match (left.as_slice(), right.as_slice()) {
                ([name], [value]) if is_zero(file, *value) => Some(file.text(*name)),
                _ => None,
            }
        }
        "var_declaration" => {
            let specs = ast::var_specs(node);
            let [spec] = specs.as_slice() else {
                return None;
            };
            let names = ast::field_names(*spec);
            match names.as_slice() {
                [name]
                    if spec.child_by_field_name("value").is_none()
                        && spec.child_by_field_name("type").is_some() =>
                {
                    Some(file.text(*name))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn is_zero(file: &GoFile, node: Node<'_>) -> bool {
    let text = file.text(node);
    match node.kind() {
        "false" => true,
        "interpreted_string_literal" => text == "\"\"",
        "raw_string_literal" => text == "``",
        "int_literal" => text.trim_start_matches('0').is_empty(),
        "float_literal" => text.parse::<f64>().is_ok_and(|f| f == 0.0),
        _ => false,
    }
}

/// `X != nil`, returning `X`.
fn nil_checked<'t>(file: &'t GoFile, condition: Node<'t>) -> Option<&'t str> {
    let condition = ast::unwrap_expr(condition);
    if condition.kind() != "binary_expression" {
        return None;
    }
    let operator = condition.child_by_field_name("operator")?;
    let left = condition.child_by_field_name("left")?;
    let right = condition.child_by_field_name("right")?;
    (file.text(operator) == "!=" && right.kind() == "nil").then(|| file.text(left))
}

impl Analyzer for PointerFrom {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for zero values assigned from a nil-checked pointer\n\n\
         `v := \"\"; if p != nil { v = *p }` should be written `v := pointer.From(p)`."
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        for file in pass.package().files().iter().filter(|f| !f.is_test()) {
            for finding in find(file) {
                let replacement = format!("{} := pointer.From({})", finding.variable, finding.pointer);
                pass.report_with_suggestion(
                    file,
                    finding.declaration,
                    format!(
                        "`{}` can be initialised with `pointer.From({})`",
                        finding.variable, finding.pointer
                    ),
                    Suggestion::with_replacement(
                        "replace the declaration and the nil check",
                        replacement,
                    ),
                );
            }
        }
        Ok(None)
    }
}
