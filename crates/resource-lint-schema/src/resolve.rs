//! Resolution of schema expressions to [`SchemaInfo`] and [`SchemaMap`].
//!
//! A schema value is a literal, a call, or a local variable holding one of
//! those. [`Resolver`] handles each shape in one place; the local tier
//! stops at calls, the complete tier follows them through the common
//! schema cache, the current package and the package registry.

use resource_lint_go::ast::{self, Walk};
use resource_lint_go::package::{receiver_type_name, receiver_var_name};
use resource_lint_go::{GoFile, GoPackage, Node, NodeRef, PackageRegistry};
use tracing::debug;

use crate::common::CommonSchemas;
use crate::literal::{
    is_resource_type, is_schema_map_type, is_schema_type, is_under_elem, literal_body,
    literal_type, strip_address, type_name, type_qualifier, FUNCTION_KINDS,
};
use crate::model::{FlagSite, SchemaElem, SchemaField, SchemaInfo, SchemaMap, SchemaType, UnresolvedKey};

/// Calls and variables followed before giving up on an expression.
pub const MAX_DEPTH: usize = 8;

/// Marker an Optional+Computed attribute carries between its two flags.
pub const OC_NOTE: &str = "NOTE: O+C";

/// An expression together with the file and package it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    /// Package owning `file`.
    pub package: &'a GoPackage,
    /// File holding the expression.
    pub file: &'a GoFile,
}

impl<'a> Site<'a> {
    /// Creates a site.
    #[must_use]
    pub fn new(package: &'a GoPackage, file: &'a GoFile) -> Self {
        Self { package, file }
    }
}

/// The syntactic shapes a schema value can take.
#[derive(Debug, Clone, Copy)]
pub enum SchemaExpr<'t> {
    /// A composite literal, possibly behind `&` or with its type elided.
    Literal(Node<'t>),
    /// A function or method call.
    Call(Node<'t>),
    /// An identifier naming a local variable.
    TracedVariable(Node<'t>),
}

impl<'t> SchemaExpr<'t> {
    /// Classifies `node`, or `None` for shapes that are never followed.
    #[must_use]
    pub fn classify(node: Node<'t>) -> Option<Self> {
        let node = strip_address(ast::unwrap_expr(node));
        match node.kind() {
            "composite_literal" | "literal_value" => Some(Self::Literal(node)),
            "call_expression" => Some(Self::Call(node)),
            "identifier" => Some(Self::TracedVariable(node)),
            _ => None,
        }
    }
}

/// What an expression resolved to.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// A `map[string]*Schema`.
    Map(SchemaMap),
    /// A single `Schema`.
    Schema(SchemaInfo),
    /// The schema map of a `Resource` literal.
    Block(SchemaMap),
}

/// Functions and definitions currently being followed.
#[derive(Debug, Default)]
struct Guard {
    stack: Vec<NodeRef>,
}

impl Guard {
    fn enter(&mut self, node: NodeRef) -> bool {
        if self.stack.len() >= MAX_DEPTH || self.stack.contains(&node) {
            debug!("Not following {:?}: depth {} or cycle", node, self.stack.len());
            return false;
        }
        self.stack.push(node);
        true
    }

    fn leave(&mut self) {
        self.stack.pop();
    }
}

/// Resolves schema expressions.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a PackageRegistry,
    common: Option<&'a CommonSchemas>,
    follow_calls: bool,
}

impl<'a> Resolver<'a> {
    /// Literals and local variables only.
    #[must_use]
    pub fn local(registry: &'a PackageRegistry) -> Self {
        Self {
            registry,
            common: None,
            follow_calls: false,
        }
    }

    /// Follows calls through `common`, the current package and `registry`.
    #[must_use]
    pub fn complete(registry: &'a PackageRegistry, common: &'a CommonSchemas) -> Self {
        Self {
            registry,
            common: Some(common),
            follow_calls: true,
        }
    }

    /// Resolves any schema-valued expression.
    #[must_use]
    pub fn resolve(&self, site: Site<'a>, node: Node<'a>) -> Option<Resolved> {
        self.value(site, node, &mut Guard::default())
    }

    /// Resolves a `map[string]*Schema` composite literal.
    #[must_use]
    pub fn schema_map(&self, site: Site<'a>, literal: Node<'a>) -> SchemaMap {
        self.map_literal(site, literal, &mut Guard::default())
    }

    /// Reads a standalone `Schema` composite literal.
    #[must_use]
    pub fn schema(&self, site: Site<'a>, literal: Node<'a>) -> SchemaInfo {
        let mut guard = Guard::default();
        match literal_body(literal) {
            Some(body) => self.schema_body(site, literal, body, &mut guard),
            None => SchemaInfo::default(),
        }
    }

    /// Declaration targeted by a call's function expression: a function in
    /// the current package, a function in an imported package, or a method
    /// whose receiver type can be read off the operand.
    #[must_use]
    pub fn callee(&self, site: Site<'a>, function: Node<'a>) -> Option<(Site<'a>, Node<'a>)> {
        let file = site.file;
        match function.kind() {
            "identifier" => site
                .package
                .find_function(file.text(function))
                .map(|(f, decl)| (Site::new(site.package, f), decl)),
            "selector_expression" => {
                let (operand, field) = ast::selector_parts(function)?;
                let name = file.text(field);
                let operand = strip_address(ast::unwrap_expr(operand));
                if operand.kind() == "identifier" {
                    if let Some(path) = self.registry.resolve_import(file, file.text(operand)) {
                        let package: &'a GoPackage = self.registry.get(path)?;
                        let (f, decl) = package.find_function(name)?;
                        return Some((Site::new(package, f), decl));
                    }
                }
                let (package, owner) = self.operand_type(site, operand)?;
                let (f, decl) = package.find_method(owner, name)?;
                Some((Site::new(package, f), decl))
            }
            _ => None,
        }
    }

    fn value(&self, site: Site<'a>, node: Node<'a>, guard: &mut Guard) -> Option<Resolved> {
        match SchemaExpr::classify(node)? {
            SchemaExpr::Literal(literal) => self.literal(site, literal, guard),
            SchemaExpr::Call(call) => self.call(site, call, guard),
            SchemaExpr::TracedVariable(ident) => {
                let definition = trace_variable(site.file, ident)?;
                if !guard.enter(site.file.node_ref(definition)) {
                    return None;
                }
                let resolved = self.value(site, definition, guard);
                guard.leave();
                resolved
            }
        }
    }

    fn literal(&self, site: Site<'a>, literal: Node<'a>, guard: &mut Guard) -> Option<Resolved> {
        if literal.kind() == "literal_value" {
            return Some(Resolved::Schema(self.schema_body(site, literal, literal, guard)));
        }
        let ty = literal_type(literal)?;
        let body = literal_body(literal)?;
        if is_schema_map_type(site.file, ty) {
            Some(Resolved::Map(self.map_literal(site, literal, guard)))
        } else if is_schema_type(site.file, ty) {
            Some(Resolved::Schema(self.schema_body(site, literal, body, guard)))
        } else if is_resource_type(site.file, ty) {
            self.resource_block(site, body, guard).map(Resolved::Block)
        } else {
            None
        }
    }

    fn call(&self, site: Site<'a>, call: Node<'a>, guard: &mut Guard) -> Option<Resolved> {
        if !self.follow_calls {
            return None;
        }
        let (function, args) = ast::call_parts(call)?;
        if let Some(info) = self.common_schema(site, function) {
            return Some(Resolved::Schema(info.clone()));
        }

        if let Some((target, decl)) = self.callee(site, function) {
            if !guard.enter(target.file.node_ref(decl)) {
                return None;
            }
            let resolved = return_expression(decl).and_then(|e| self.value(target, e, guard));
            guard.leave();
            if resolved.is_some() {
                return resolved;
            }
        }

        self.merge_call(site, &args, guard)
    }

    /// `merge(base, overlay)`-style helpers whose body cannot be followed.
    fn merge_call(&self, site: Site<'a>, args: &[Node<'a>], guard: &mut Guard) -> Option<Resolved> {
        let [base, overlay, ..] = args else {
            return None;
        };
        let Some(Resolved::Map(base)) = self.value(site, *base, guard) else {
            return None;
        };
        let Some(Resolved::Map(overlay)) = self.value(site, *overlay, guard) else {
            return None;
        };
        Some(Resolved::Map(SchemaMap::merge(base, overlay)))
    }

    fn common_schema(&self, site: Site<'a>, function: Node<'a>) -> Option<&'a SchemaInfo> {
        let common = self.common?;
        let (operand, field) = ast::selector_parts(function)?;
        if operand.kind() != "identifier" {
            return None;
        }
        let path = self.registry.resolve_import(site.file, site.file.text(operand))?;
        common.get(path, site.file.text(field))
    }

    fn map_literal(&self, site: Site<'a>, literal: Node<'a>, guard: &mut Guard) -> SchemaMap {
        let file = site.file;
        let mut map = SchemaMap {
            id: file.node_ref(literal),
            position: file.position(literal),
            nested: is_under_elem(file, literal),
            fields: Vec::new(),
            unresolved: 0,
            unresolved_keys: Vec::new(),
        };
        let Some(body) = literal_body(literal) else {
            return map;
        };

        for entry in ast::literal_entries(body) {
            let key = entry.key.filter(|k| ast::is_string_literal(*k));
            let info = match self.value(site, entry.value, guard) {
                Some(Resolved::Schema(info)) => Some(info),
                _ => None,
            };
            match (key, info) {
                (Some(key), Some(info)) => map.fields.push(SchemaField {
                    name: ast::unquote(file.text(key)).to_owned(),
                    info,
                    position: map.fields.len(),
                    file: file.key(),
                    key_position: file.position(key),
                }),
                (key, None) => {
                    debug!(
                        "Unresolved schema entry at {}:{}",
                        file.display_path().display(),
                        file.position(entry.node).line
                    );
                    map.unresolved += 1;
                    if let Some(key) = key {
                        map.unresolved_keys.push(UnresolvedKey {
                            name: ast::unquote(file.text(key)).to_owned(),
                            file: file.key(),
                            key_position: file.position(key),
                        });
                    }
                }
                (None, Some(_)) => {
                    debug!(
                        "Schema entry without a string key at {}:{}",
                        file.display_path().display(),
                        file.position(entry.node).line
                    );
                    map.unresolved += 1;
                }
            }
        }
        map
    }

    fn resource_block(&self, site: Site<'a>, body: Node<'a>, guard: &mut Guard) -> Option<SchemaMap> {
        let entry = ast::literal_entries(body)
            .into_iter()
            .find(|e| e.key.is_some_and(|k| site.file.text(k) == "Schema"))?;
        match self.value(site, entry.value, guard)? {
            Resolved::Map(map) => Some(map),
            _ => None,
        }
    }

    fn schema_body(
        &self,
        site: Site<'a>,
        anchor: Node<'a>,
        body: Node<'a>,
        guard: &mut Guard,
    ) -> SchemaInfo {
        let file = site.file;
        let mut info = SchemaInfo {
            file: Some(file.key()),
            position: file.position(anchor),
            ..SchemaInfo::default()
        };

        for entry in ast::literal_entries(body) {
            let Some(key) = entry.key else {
                continue;
            };
            let value = file.text(entry.value);
            let is_true = value == "true";
            let site_of = |node: Node<'_>| FlagSite {
                offset: node.start_byte(),
                position: file.position(node),
            };
            match file.text(key) {
                "Type" => {
                    info.schema_type = SchemaType::from_name(value.rsplit('.').next().unwrap_or(value));
                }
                "Required" => info.required = is_true,
                "Optional" => {
                    info.optional = is_true;
                    info.optional_at = is_true.then(|| site_of(entry.node));
                }
                "Computed" => {
                    info.computed = is_true;
                    info.computed_at = is_true.then(|| site_of(entry.node));
                }
                "ForceNew" => info.force_new = is_true,
                "ValidateFunc" | "ValidateDiagFunc" => info.has_validation = value != "nil",
                "MaxItems" => info.max_items = value.parse().ok(),
                "AtLeastOneOf" => info.at_least_one_of = value != "nil",
                "Elem" => {
                    let line = file.position(entry.node).line;
                    info.elem_line = Some(line);
                    info.elem_comment = file.comments_on_line(line).next().is_some();
                    info.elem = Some(match self.value(site, entry.value, guard) {
                        Some(Resolved::Block(mut map)) => {
                            map.nested = true;
                            SchemaElem::Block(map)
                        }
                        Some(Resolved::Schema(schema)) => SchemaElem::Schema(Box::new(schema)),
                        _ => SchemaElem::Unresolved,
                    });
                }
                _ => {}
            }
        }

        if let (Some(optional), Some(computed)) = (info.optional_at, info.computed_at) {
            if optional.offset < computed.offset {
                info.oc_note = file
                    .comments_between(optional.offset, computed.offset)
                    .any(|c| c.text.contains(OC_NOTE));
            }
        }
        info
    }

    /// Package and type name of a method-call operand.
    fn operand_type(&self, site: Site<'a>, operand: Node<'a>) -> Option<(&'a GoPackage, &'a str)> {
        let file = site.file;
        match operand.kind() {
            "composite_literal" => self.named_type(site, literal_type(operand)?),
            "identifier" => {
                let name = file.text(operand);
                if let Some(method) = ast::enclosing(operand, &["method_declaration"]) {
                    if receiver_var_name(file, method) == Some(name) {
                        return receiver_type_name(file, method).map(|t| (site.package, t));
                    }
                }
                let definition = strip_address(ast::unwrap_expr(trace_variable(file, operand)?));
                self.named_type(site, literal_type(definition)?)
            }
            "selector_expression" => {
                let (inner, field) = ast::selector_parts(operand)?;
                let (package, owner) = self.operand_type(site, strip_address(ast::unwrap_expr(inner)))?;
                self.field_type(package, owner, file.text(field))
            }
            _ => None,
        }
    }

    fn named_type(&self, site: Site<'a>, ty: Node<'a>) -> Option<(&'a GoPackage, &'a str)> {
        let name = type_name(site.file, ty)?;
        match type_qualifier(site.file, ty) {
            Some(alias) => {
                let path = self.registry.resolve_import(site.file, alias)?;
                let package: &'a GoPackage = self.registry.get(path)?;
                Some((package, name))
            }
            None => Some((site.package, name)),
        }
    }

    /// Type of field `field` of struct `owner`; embedded fields are named
    /// after their type.
    fn field_type(&self, package: &'a GoPackage, owner: &str, field: &str) -> Option<(&'a GoPackage, &'a str)> {
        let (file, spec) = package.find_type(owner)?;
        let declarations = struct_fields(spec)?;
        for declaration in declarations {
            let Some(ty) = declaration.child_by_field_name("type") else {
                continue;
            };
            let names = ast::field_names(declaration);
            let matches = if names.is_empty() {
                type_name(file, ty) == Some(field)
            } else {
                names.iter().any(|n| file.text(*n) == field)
            };
            if matches {
                return self.named_type(Site::new(package, file), ty);
            }
        }
        None
    }
}

/// `field_declaration`s of a struct `type_spec`.
#[must_use]
pub fn struct_fields(spec: Node<'_>) -> Option<Vec<Node<'_>>> {
    let ty = spec.child_by_field_name("type")?;
    if ty.kind() != "struct_type" {
        return None;
    }
    let list = ast::first_named(ty)?;
    Some(
        ast::named_children(list)
            .into_iter()
            .filter(|n| n.kind() == "field_declaration")
            .collect(),
    )
}

/// First value of the last top-level `return` of a function or method.
#[must_use]
pub fn return_expression(decl: Node<'_>) -> Option<Node<'_>> {
    let body = decl.child_by_field_name("body")?;
    let ret = ast::block_statements(body)
        .into_iter()
        .rev()
        .find(|s| s.kind() == "return_statement")?;
    let values = ast::first_named(ret)?;
    ast::expressions(values).into_iter().next()
}

/// Latest definition of the variable `ident` that completes before the use,
/// within the enclosing function.
#[must_use]
pub fn trace_variable<'t>(file: &GoFile, ident: Node<'t>) -> Option<Node<'t>> {
    let name = file.text(ident);
    let scope = ast::enclosing(ident, FUNCTION_KINDS)?;
    let used_at = ident.start_byte();
    let mut latest: Option<(usize, Node<'t>)> = None;

    ast::walk(scope, |n| {
        if n.start_byte() >= used_at {
            return Walk::Skip;
        }
        let value = if n.end_byte() > used_at {
            None
        } else {
            match n.kind() {
                "short_var_declaration" => paired_value(file, n, "left", "right", name),
                "assignment_statement" => {
                    let plain = n
                        .child_by_field_name("operator")
                        .map_or(true, |op| file.text(op) == "=");
                    if plain {
                        paired_value(file, n, "left", "right", name)
                    } else {
                        None
                    }
                }
                "var_spec" => spec_value(file, n, name),
                _ => None,
            }
        };
        if let Some(value) = value {
            if latest.map_or(true, |(at, _)| n.start_byte() >= at) {
                latest = Some((n.start_byte(), value));
            }
        }
        Walk::Continue
    });

    latest.map(|(_, value)| value)
}

fn paired_value<'t>(file: &GoFile, stmt: Node<'t>, left: &str, right: &str, name: &str) -> Option<Node<'t>> {
    let lefts = ast::expressions(stmt.child_by_field_name(left)?);
    let rights = ast::expressions(stmt.child_by_field_name(right)?);
    if lefts.len() != rights.len() {
        return None;
    }
    let index = lefts
        .iter()
        .position(|l| l.kind() == "identifier" && file.text(*l) == name)?;
    rights.get(index).copied()
}

fn spec_value<'t>(file: &GoFile, spec: Node<'t>, name: &str) -> Option<Node<'t>> {
    let names = ast::field_names(spec);
    let index = names.iter().position(|n| file.text(*n) == name)?;
    let values = ast::expressions(spec.child_by_field_name("value")?);
    if values.len() != names.len() {
        return None;
    }
    values.get(index).copied()
}
