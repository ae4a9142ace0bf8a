//! Recognition of schema-shaped Go syntax.
//!
//! Types are matched by name, whatever package they come from:
//! `pluginsdk.Schema`, `schema.Schema` and a bare `Schema` all count.

use resource_lint_go::{ast, GoFile, Node};

/// Declared name of a type expression, looking through pointers.
#[must_use]
pub fn type_name<'a>(file: &'a GoFile, ty: Node<'_>) -> Option<&'a str> {
    match ty.kind() {
        "type_identifier" => Some(file.text(ty)),
        "qualified_type" => ty.child_by_field_name("name").map(|n| file.text(n)),
        "pointer_type" | "generic_type" => type_name(file, ast::first_named(ty)?),
        _ => None,
    }
}

/// Package qualifier of a type expression (`pluginsdk` in `*pluginsdk.Schema`).
#[must_use]
pub fn type_qualifier<'a>(file: &'a GoFile, ty: Node<'_>) -> Option<&'a str> {
    match ty.kind() {
        "qualified_type" => ty.child_by_field_name("package").map(|n| file.text(n)),
        "pointer_type" | "generic_type" => type_qualifier(file, ast::first_named(ty)?),
        _ => None,
    }
}

/// `Schema` or `pkg.Schema`.
#[must_use]
pub fn is_schema_type(file: &GoFile, ty: Node<'_>) -> bool {
    matches!(ty.kind(), "type_identifier" | "qualified_type") && type_name(file, ty) == Some("Schema")
}

/// `Resource` or `pkg.Resource`.
#[must_use]
pub fn is_resource_type(file: &GoFile, ty: Node<'_>) -> bool {
    matches!(ty.kind(), "type_identifier" | "qualified_type") && type_name(file, ty) == Some("Resource")
}

/// `map[string]*Schema`.
#[must_use]
pub fn is_schema_map_type(file: &GoFile, ty: Node<'_>) -> bool {
    if ty.kind() != "map_type" {
        return false;
    }
    let key = ty.child_by_field_name("key");
    let value = ty.child_by_field_name("value");
    match (key, value) {
        (Some(key), Some(value)) => {
            file.text(key) == "string"
                && value.kind() == "pointer_type"
                && ast::first_named(value).is_some_and(|inner| is_schema_type(file, inner))
        }
        _ => false,
    }
}

/// Type expression of a composite literal.
#[must_use]
pub fn literal_type(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() != "composite_literal" {
        return None;
    }
    node.child_by_field_name("type")
}

/// `literal_value` body of a composite literal.
#[must_use]
pub fn literal_body(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() != "composite_literal" {
        return None;
    }
    node.child_by_field_name("body")
}

/// Strips a leading `&`.
#[must_use]
pub fn strip_address(node: Node<'_>) -> Node<'_> {
    ast::address_of_operand(node).unwrap_or(node)
}

/// The `keyed_element` whose value is `node`, looking through `&`,
/// parentheses and element wrappers.
#[must_use]
pub fn keyed_parent(node: Node<'_>) -> Option<Node<'_>> {
    let mut child = node;
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "literal_element" | "parenthesized_expression" => {}
            "unary_expression"
                if n.child_by_field_name("operator").is_some_and(|o| o.kind() == "&") => {}
            "keyed_element" => {
                let parts = ast::named_children(n);
                return (parts.len() >= 2 && parts.last() == Some(&child)).then_some(n);
            }
            _ => return None,
        }
        child = n;
        current = n.parent();
    }
    None
}

/// Key text of a `keyed_element` (`Elem`, `"name"`, ...).
#[must_use]
pub fn key_text<'a>(file: &'a GoFile, keyed: Node<'_>) -> Option<&'a str> {
    let key = keyed
        .child_by_field_name("key")
        .or_else(|| ast::first_named(keyed))?;
    Some(file.text(ast::unwrap_expr(key)))
}

/// The composite literal owning a `keyed_element`.
#[must_use]
pub fn owning_literal(keyed: Node<'_>) -> Option<Node<'_>> {
    let body = keyed.parent()?;
    if body.kind() != "literal_value" {
        return None;
    }
    body.parent().filter(|p| p.kind() == "composite_literal")
}

/// Whether `node` is the value of an `Elem:` key.
#[must_use]
pub fn is_elem_value(file: &GoFile, node: Node<'_>) -> bool {
    keyed_parent(node).is_some_and(|k| key_text(file, k) == Some("Elem"))
}

/// Whether `node` is a value of a `map[string]*Schema` literal.
#[must_use]
pub fn is_map_entry_value(file: &GoFile, node: Node<'_>) -> bool {
    keyed_parent(node)
        .and_then(owning_literal)
        .and_then(literal_type)
        .is_some_and(|ty| is_schema_map_type(file, ty))
}

/// Whether some ancestor of `node` is the value of an `Elem:` key.
#[must_use]
pub fn is_under_elem(file: &GoFile, node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "keyed_element" && key_text(file, n) == Some("Elem") {
            return true;
        }
        if FUNCTION_KINDS.contains(&n.kind()) {
            return false;
        }
        current = n.parent();
    }
    false
}

/// Whether `node` sits inside an `if` of its enclosing function.
#[must_use]
pub fn is_conditional(node: Node<'_>) -> bool {
    ast::has_ancestor_before(node, "if_statement", FUNCTION_KINDS)
}

/// Node kinds that open a function scope.
pub const FUNCTION_KINDS: &[&str] = &["function_declaration", "method_declaration", "func_literal"];
