//! Check that `Update()` handles every updatable property of a new typed
//! resource.
//!
//! # Rationale
//!
//! A property that is neither ForceNew nor computed can change in place.
//! Optional+Computed properties are left out, since the API may set them. If `Update()` never looks at it, the change is planned, applied
//! as a no-op, and shows up again as drift on the next plan.
//!
//! # Coverage
//!
//! A property counts as handled when the update function body:
//!
//! - names it in `HasChange`, `HasChanges`, `Get`, `GetOk` or `GetChange`
//! - reads the model field tagged with it, through a variable of the model
//!   type (`var m Model`, `m := Model{}`, or `&m` passed to `Decode`)
//!
//! When the body passes a model variable to a helper at the top level,
//! outside any conditional, the check abstains for that resource.

use std::collections::HashSet;

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_go::ast::{self, Walk};
use resource_lint_go::{GoFile, Node, Position};
use resource_lint_schema::literal::{literal_type, strip_address, type_name};
use resource_lint_schema::{typed, SchemaField, SchemaMap, TypedResourceInfo, TypedResources};
use tracing::debug;

use crate::report_in;

/// Check code.
pub const CODE: &str = "AZNR002";

/// `ResourceData` methods whose string arguments name attributes.
const CHANGE_METHODS: &[&str] = &["HasChange", "HasChanges", "Get", "GetOk", "GetChange"];

/// Calls that pass the model without handing the update over.
const MODEL_IO: &[&str] = &["Decode", "Encode"];

/// Statement kinds that make their contents conditional.
const BRANCHING: &[&str] = &[
    "if_statement",
    "for_statement",
    "expression_switch_statement",
    "type_switch_statement",
    "select_statement",
    "func_literal",
    "block",
];

/// Flags updatable properties that `Update()` never reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateCoverage;

impl UpdateCoverage {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Properties that can change without recreating the resource.
fn updatable(arguments: &SchemaMap) -> impl Iterator<Item = &SchemaField> {
    arguments
        .fields
        .iter()
        .filter(|f| !f.info.computed && !f.info.force_new)
}

/// Variables of the model type declared or decoded in `body`.
fn model_variables<'t>(file: &'t GoFile, body: Node<'t>, model: &str) -> HashSet<&'t str> {
    let mut vars = HashSet::new();
    ast::walk(body, |node| {
        match node.kind() {
            "var_spec" => {
                let typed = node
                    .child_by_field_name("type")
                    .and_then(|ty| type_name(file, ty))
                    == Some(model);
                if typed {
                    vars.extend(ast::field_names(node).into_iter().map(|n| file.text(n)));
                }
            }
            "short_var_declaration" => {
                let (Some(left), Some(right)) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) else {
                    return Walk::Continue;
                };
                for (name, value) in ast::expressions(left).into_iter().zip(ast::expressions(right)) {
                    let value = strip_address(ast::unwrap_expr(value));
                    if literal_type(value).and_then(|ty| type_name(file, ty)) == Some(model) {
                        vars.insert(file.text(name));
                    }
                }
            }
            "call_expression" => {
                let Some((function, args)) = ast::call_parts(node) else {
                    return Walk::Continue;
                };
                let is_decode = ast::selector_parts(function).is_some_and(|(_, f)| file.text(f) == "Decode");
                if is_decode {
                    vars.extend(
                        args.into_iter()
                            .filter_map(ast::address_of_operand)
                            .filter(|n| n.kind() == "identifier")
                            .map(|n| file.text(n)),
                    );
                }
            }
            _ => {}
        }
        Walk::Continue
    });
    vars
}

/// Attribute names the body reads.
fn covered<'t>(
    file: &'t GoFile,
    body: Node<'t>,
    models: &HashSet<&str>,
    resource: &'t TypedResourceInfo,
) -> HashSet<&'t str> {
    let mut out = HashSet::new();
    ast::walk(body, |node| {
        if let Some((function, args)) = ast::call_parts(node) {
            let is_change_method = ast::selector_parts(function)
                .is_some_and(|(_, method)| CHANGE_METHODS.contains(&file.text(method)));
            if is_change_method {
                out.extend(
                    args.into_iter()
                        .filter(|a| ast::is_string_literal(*a))
                        .map(|a| ast::unquote(file.text(a))),
                );
            }
        } else if let Some((operand, field)) = ast::selector_parts(node) {
            if operand.kind() == "identifier" && models.contains(file.text(operand)) {
                if let Some(attribute) = resource.model_to_schema.get(file.text(field)) {
                    out.insert(attribute.as_str());
                }
            }
        }
        Walk::Continue
    });
    out
}

/// Whether a top-level statement of `body` hands a model variable to a
/// helper.
fn delegates(file: &GoFile, body: Node<'_>, models: &HashSet<&str>) -> bool {
    let mut found = false;
    for statement in ast::block_statements(body) {
        if BRANCHING.contains(&statement.kind()) {
            continue;
        }
        ast::walk(statement, |node| {
            if BRANCHING.contains(&node.kind()) {
                return Walk::Skip;
            }
            let Some((function, args)) = ast::call_parts(node) else {
                return Walk::Continue;
            };
            let method = ast::selector_parts(function).map_or(function, |(_, m)| m);
            if MODEL_IO.contains(&file.text(method)) {
                return Walk::Continue;
            }
            found |= args.into_iter().any(|arg| {
                let arg = strip_address(ast::unwrap_expr(arg));
                arg.kind() == "identifier" && models.contains(file.text(arg))
            });
            Walk::Continue
        });
    }
    found
}

impl Analyzer for UpdateCoverage {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for updatable properties that Update() never handles\n\n\
         In new typed resources, every property that is neither ForceNew nor \
         computed must be read by the Update function, through HasChange \
         or the tagged model field."
    }

    fn requires(&self) -> &'static [&'static str] {
        &[typed::NAME]
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(typed) = pass.fact::<TypedResources>(typed::NAME) else {
            return Ok(None);
        };
        for resource in &typed.resources {
            let Some(file) = pass.package().file(resource.file) else {
                continue;
            };
            if !pass.is_new_file(file) {
                continue;
            }
            let (Some(body_ref), Some(arguments)) = (resource.update_body, &resource.arguments_properties) else {
                continue;
            };
            let Some(body_file) = pass.registry().file(body_ref.file) else {
                continue;
            };
            let Some(body) = body_file.resolve(&body_ref) else {
                continue;
            };

            let models = resource
                .model_name
                .as_deref()
                .map(|model| model_variables(body_file, body, model))
                .unwrap_or_default();
            if delegates(body_file, body, &models) {
                debug!(
                    "{}: Update hands the model to a helper, not checked",
                    resource.resource_type
                );
                continue;
            }
            let handled = covered(body_file, body, &models, resource);

            let update_position = resource
                .update
                .and_then(|decl| Some(file.position(file.resolve(&decl)?)));
            for field in updatable(arguments).filter(|f| !handled.contains(f.name.as_str())) {
                let position: Position = if field.file == resource.file {
                    field.key_position
                } else if let Some(position) = update_position {
                    position
                } else {
                    continue;
                };
                report_in(
                    pass,
                    resource.file,
                    position,
                    format!(
                        "`{}` of {} is updatable but not handled in Update()",
                        field.name, resource.resource_type
                    ),
                    Some(Suggestion::new(format!(
                        "check `metadata.ResourceData.HasChange(\"{}\")` in Update, or mark the property ForceNew",
                        field.name
                    ))),
                );
            }
        }
        Ok(None)
    }
}
