//! Traversal helpers over the tree-sitter Go grammar.
//!
//! The grammar has shifted shape between releases (`statement_list`
//! inside blocks, `literal_element` wrappers inside composite literals,
//! `var_spec_list` groups); these helpers hide those differences from the
//! analyzers.

use tree_sitter::Node;

/// Walk control returned by [`walk`] visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Visit the children of this node.
    Continue,
    /// Skip the children of this node.
    Skip,
}

/// Pre-order traversal of the named nodes below (and including) `root`.
pub fn walk<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>) -> Walk) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let descend = node.is_named() && visit(node) == Walk::Continue;
        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.node() == root {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// First named child that is not a comment.
#[must_use]
pub fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    named_children(node).into_iter().next()
}

/// Named children excluding comments.
#[must_use]
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// Statements of a `block`, flattening any `statement_list` wrapper.
#[must_use]
pub fn block_statements(block: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    for child in named_children(block) {
        if child.kind() == "statement_list" {
            out.extend(named_children(child));
        } else {
            out.push(child);
        }
    }
    out
}

/// Items of an `expression_list`, or the node itself for a bare expression.
#[must_use]
pub fn expressions(node: Node<'_>) -> Vec<Node<'_>> {
    if node.kind() == "expression_list" {
        named_children(node)
    } else {
        vec![node]
    }
}

/// Strips `literal_element` and parenthesis wrappers.
#[must_use]
pub fn unwrap_expr(mut node: Node<'_>) -> Node<'_> {
    while matches!(node.kind(), "literal_element" | "parenthesized_expression") {
        match first_named(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// One element of a composite literal body.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'t> {
    /// The `keyed_element` or bare element node.
    pub node: Node<'t>,
    /// Key expression, for keyed elements.
    pub key: Option<Node<'t>>,
    /// Value expression or nested `literal_value`.
    pub value: Node<'t>,
}

/// Elements of a `literal_value` in source order.
#[must_use]
pub fn literal_entries(body: Node<'_>) -> Vec<Entry<'_>> {
    let mut out = Vec::new();
    for child in named_children(body) {
        match child.kind() {
            "keyed_element" => {
                let parts = named_children(child);
                let key = child
                    .child_by_field_name("key")
                    .or_else(|| parts.first().copied());
                let value = child
                    .child_by_field_name("value")
                    .or_else(|| parts.get(1).copied());
                if let (Some(key), Some(value)) = (key, value) {
                    out.push(Entry {
                        node: child,
                        key: Some(unwrap_expr(key)),
                        value: unwrap_expr(value),
                    });
                }
            }
            _ => out.push(Entry {
                node: child,
                key: None,
                value: unwrap_expr(child),
            }),
        }
    }
    out
}

/// Strips the quotes of a Go string literal. Escapes are left as written.
#[must_use]
pub fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'`' && last == b'`') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Whether `node` is a string literal.
#[must_use]
pub fn is_string_literal(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "interpreted_string_literal" | "raw_string_literal"
    )
}

/// Function expression and argument nodes of a `call_expression`.
#[must_use]
pub fn call_parts(call: Node<'_>) -> Option<(Node<'_>, Vec<Node<'_>>)> {
    if call.kind() != "call_expression" {
        return None;
    }
    let function = call.child_by_field_name("function")?;
    let args = call
        .child_by_field_name("arguments")
        .map(named_children)
        .unwrap_or_default();
    Some((function, args))
}

/// For `operand.field`, returns `(operand, field)`.
#[must_use]
pub fn selector_parts(node: Node<'_>) -> Option<(Node<'_>, Node<'_>)> {
    if node.kind() != "selector_expression" {
        return None;
    }
    Some((
        node.child_by_field_name("operand")?,
        node.child_by_field_name("field")?,
    ))
}

/// Operand of a `&x` unary expression.
#[must_use]
pub fn address_of_operand(node: Node<'_>) -> Option<Node<'_>> {
    if node.kind() != "unary_expression" {
        return None;
    }
    let operator = node.child_by_field_name("operator")?;
    if operator.kind() != "&" {
        return None;
    }
    node.child_by_field_name("operand").map(unwrap_expr)
}

/// Whether any ancestor of `node`, up to (excluding) `stop`, has kind `kind`.
#[must_use]
pub fn has_ancestor_before(node: Node<'_>, kind: &str, stop: &[&str]) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == kind {
            return true;
        }
        if stop.contains(&n.kind()) {
            return false;
        }
        current = n.parent();
    }
    false
}

/// Nearest ancestor of one of the given kinds.
#[must_use]
pub fn enclosing<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if kinds.contains(&n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Identifiers declared by a `var_declaration`, with their type and value.
#[must_use]
pub fn var_specs(decl: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    for child in named_children(decl) {
        match child.kind() {
            "var_spec" => out.push(child),
            "var_spec_list" => out.extend(
                named_children(child)
                    .into_iter()
                    .filter(|n| n.kind() == "var_spec"),
            ),
            _ => {}
        }
    }
    out
}

/// Name nodes of a `var_spec`, `const_spec` or `parameter_declaration`.
#[must_use]
pub fn field_names<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name("name", &mut cursor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GoFile;

    fn parse(src: &str) -> GoFile {
        GoFile::parse("/w/a.go", "a.go", src.to_owned()).expect("parse")
    }

    fn find<'t>(file: &'t GoFile, kind: &str) -> Vec<Node<'t>> {
        let mut out = Vec::new();
        walk(file.root(), |n| {
            if n.kind() == kind {
                out.push(n);
            }
            Walk::Continue
        });
        out
    }

    #[test]
    fn walk_can_skip_subtrees() {
        let f = parse("package x\nfunc a() { b(c()) }\n");
        let mut calls = 0;
        walk(f.root(), |n| {
            if n.kind() == "call_expression" {
                calls += 1;
                return Walk::Skip;
            }
            Walk::Continue
        });
        assert_eq!(calls, 1);
        assert_eq!(find(&f, "call_expression").len(), 2);
    }

    #[test]
    fn literal_entries_preserve_order() {
        let f = parse(
            "package x\nvar m = map[string]int{\n\t\"b\": 1,\n\t// c\n\t\"a\": 2,\n}\n",
        );
        let body = find(&f, "literal_value")[0];
        let keys: Vec<&str> = literal_entries(body)
            .iter()
            .filter_map(|e| e.key.map(|k| f.text(k)))
            .collect();
        assert_eq!(keys, vec!["\"b\"", "\"a\""]);
    }

    #[test]
    fn block_statements_skip_comments() {
        let f = parse("package x\nfunc a() {\n\t// hi\n\tb()\n\tc()\n}\n");
        let block = find(&f, "block")[0];
        assert_eq!(block_statements(block).len(), 2);
    }

    #[test]
    fn address_of_composite_literal() {
        let f = parse("package x\nvar v = &T{A: 1}\n");
        let unary = find(&f, "unary_expression")[0];
        let operand = address_of_operand(unary).expect("operand");
        assert_eq!(operand.kind(), "composite_literal");
    }

    #[test]
    fn unquote_handles_both_literal_kinds() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("`abc`"), "abc");
        assert_eq!(unquote("abc"), "abc");
    }
}
