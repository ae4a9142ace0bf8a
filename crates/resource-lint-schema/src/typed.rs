//! Typed resources: types registered through `var _ sdk.Resource... = X{}`.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass};
use resource_lint_go::package::{decl_name, receiver_type_name};
use resource_lint_go::{ast, FileKey, GoFile, GoPackage, Node, NodeRef, PackageRegistry, Position};
use tracing::debug;

use crate::common::{self, CommonSchemas};
use crate::filter::schema_files;
use crate::literal::{literal_body, literal_type, strip_address, type_name};
use crate::model::SchemaMap;
use crate::resolve::{return_expression, struct_fields, Resolved, Resolver, Site, MAX_DEPTH};

/// Analyzer name.
pub const NAME: &str = "typed-resource";

/// Prefix shared by the typed-resource interfaces.
const INTERFACE_PREFIX: &str = "Resource";

/// Struct tag key naming the schema attribute of a model field.
const SCHEMA_TAG: &str = "tfschema";

/// One field of a resource model struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelField {
    /// Go field name.
    pub name: String,
    /// Value of the `tfschema` tag.
    pub schema_name: Option<String>,
}

/// What the extractor knows about one typed resource.
#[derive(Debug, Clone)]
pub struct TypedResourceInfo {
    /// Name of the resource type.
    pub resource_type: String,
    /// File holding the interface assertion.
    pub file: FileKey,
    /// Position of the interface assertion.
    pub position: Position,
    /// Struct returned by `ModelObject()`.
    pub model_name: Option<String>,
    /// Fields of the model struct.
    pub model_fields: Vec<ModelField>,
    /// Go field name to schema attribute name.
    pub model_to_schema: BTreeMap<String, String>,
    /// `Arguments()` declaration.
    pub arguments: Option<NodeRef>,
    /// `Attributes()` declaration.
    pub attributes: Option<NodeRef>,
    /// `Create()` declaration.
    pub create: Option<NodeRef>,
    /// `Read()` declaration.
    pub read: Option<NodeRef>,
    /// `Update()` declaration.
    pub update: Option<NodeRef>,
    /// `Delete()` declaration.
    pub delete: Option<NodeRef>,
    /// Body of the function that performs the update, after following
    /// delegation to base types and helpers.
    pub update_body: Option<NodeRef>,
    /// Resolved `Arguments()` schema.
    pub arguments_properties: Option<SchemaMap>,
}

impl TypedResourceInfo {
    fn new(resource_type: &str, file: &GoFile, position: Position) -> Self {
        Self {
            resource_type: resource_type.to_owned(),
            file: file.key(),
            position,
            model_name: None,
            model_fields: Vec::new(),
            model_to_schema: BTreeMap::new(),
            arguments: None,
            attributes: None,
            create: None,
            read: None,
            update: None,
            delete: None,
            update_body: None,
            arguments_properties: None,
        }
    }
}

/// Typed resources of one package.
#[derive(Debug, Default)]
pub struct TypedResources {
    /// Resources in discovery order.
    pub resources: Vec<TypedResourceInfo>,
}

impl TypedResources {
    /// Discovers the typed resources of `package`.
    #[must_use]
    pub fn collect(package: &GoPackage, registry: &PackageRegistry, common: &CommonSchemas) -> Self {
        let resolver = Resolver::complete(registry, common);
        let mut seen = HashSet::new();
        let mut resources = Vec::new();

        for file in schema_files(package).filter(|f| f.file_name().ends_with("_resource.go")) {
            for (resource_type, position) in assertions(file) {
                if !seen.insert(resource_type.to_owned()) {
                    continue;
                }
                let site = Site::new(package, file);
                resources.push(extract(&resolver, site, resource_type, position));
            }
        }
        Self { resources }
    }

    /// Resource declared in `file`, if any.
    pub fn in_file(&self, file: FileKey) -> impl Iterator<Item = &TypedResourceInfo> {
        self.resources.iter().filter(move |r| r.file == file)
    }
}

/// `var _ sdk.Resource... = X{}` and `&X{}` assertions in `file`.
fn assertions(file: &GoFile) -> Vec<(&str, Position)> {
    let mut out = Vec::new();
    for decl in ast::named_children(file.root()) {
        if decl.kind() != "var_declaration" {
            continue;
        }
        for spec in ast::var_specs(decl) {
            let names = ast::field_names(spec);
            if names.len() != 1 || file.text(names[0]) != "_" {
                continue;
            }
            let is_resource_interface = spec
                .child_by_field_name("type")
                .and_then(|ty| type_name(file, ty))
                .is_some_and(|name| name.starts_with(INTERFACE_PREFIX));
            if !is_resource_interface {
                continue;
            }
            let resource_type = spec
                .child_by_field_name("value")
                .and_then(|values| ast::expressions(values).into_iter().next())
                .map(|value| strip_address(ast::unwrap_expr(value)))
                .and_then(literal_type)
                .and_then(|ty| type_name(file, ty));
            if let Some(resource_type) = resource_type {
                out.push((resource_type, file.position(spec)));
            }
        }
    }
    out
}

fn extract<'a>(
    resolver: &Resolver<'a>,
    site: Site<'a>,
    resource_type: &str,
    position: Position,
) -> TypedResourceInfo {
    let file = site.file;
    let mut info = TypedResourceInfo::new(resource_type, file, position);

    for decl in ast::named_children(file.root()) {
        if decl.kind() != "method_declaration" || receiver_type_name(file, decl) != Some(resource_type) {
            continue;
        }
        let handle = Some(file.node_ref(decl));
        match decl_name(file, decl) {
            Some("ModelObject") => info.model_name = model_name(file, decl).map(str::to_owned),
            Some("Arguments") => {
                info.arguments = handle;
                info.arguments_properties = return_expression(decl).and_then(|expr| {
                    match resolver.resolve(site, expr)? {
                        Resolved::Map(map) => Some(map),
                        _ => None,
                    }
                });
            }
            Some("Attributes") => info.attributes = handle,
            Some("Create") => info.create = handle,
            Some("Read") => info.read = handle,
            Some("Update") => {
                info.update = handle;
                info.update_body = update_body(resolver, site, decl, 0)
                    .map(|(target, body)| target.file.node_ref(body));
            }
            Some("Delete") => info.delete = handle,
            _ => {}
        }
    }

    if let Some(model) = &info.model_name {
        info.model_fields = model_fields(site.package, model);
        info.model_to_schema = info
            .model_fields
            .iter()
            .filter_map(|f| Some((f.name.clone(), f.schema_name.clone()?)))
            .collect();
    }

    debug!(
        "Typed resource {} (model {:?}, update {})",
        info.resource_type,
        info.model_name,
        info.update_body.is_some()
    );
    info
}

/// Struct named by `ModelObject()`'s return value.
fn model_name<'a>(file: &'a GoFile, decl: Node<'_>) -> Option<&'a str> {
    let value = strip_address(ast::unwrap_expr(return_expression(decl)?));
    type_name(file, literal_type(value)?)
}

fn model_fields(package: &GoPackage, model: &str) -> Vec<ModelField> {
    let Some((file, spec)) = package.find_type(model) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for declaration in struct_fields(spec).unwrap_or_default() {
        let schema_name = declaration
            .child_by_field_name("tag")
            .and_then(|tag| tag_value(file.text(tag), SCHEMA_TAG))
            .map(str::to_owned);
        for name in ast::field_names(declaration) {
            out.push(ModelField {
                name: file.text(name).to_owned(),
                schema_name: schema_name.clone(),
            });
        }
    }
    out
}

/// Value of `key` in a Go struct tag, without options after a comma.
#[must_use]
pub fn tag_value<'t>(tag: &'t str, key: &str) -> Option<&'t str> {
    let tag = ast::unquote(tag);
    let needle = format!("{key}:\"");
    let start = tag.find(&needle)? + needle.len();
    let rest = &tag[start..];
    let value = &rest[..rest.find('"')?];
    value.split(',').next().filter(|v| !v.is_empty())
}

/// Follows `Update()` to the function literal doing the work: a `Func:`
/// inside the returned literal, a method on an embedded base type, or a
/// package helper.
fn update_body<'a>(
    resolver: &Resolver<'a>,
    site: Site<'a>,
    decl: Node<'a>,
    depth: usize,
) -> Option<(Site<'a>, Node<'a>)> {
    if depth >= MAX_DEPTH {
        debug!("Update delegation deeper than {}, giving up", MAX_DEPTH);
        return None;
    }
    let expr = strip_address(ast::unwrap_expr(return_expression(decl)?));
    match expr.kind() {
        "composite_literal" => {
            let body = literal_body(expr)?;
            let func = ast::literal_entries(body)
                .into_iter()
                .find(|e| e.key.is_some_and(|k| site.file.text(k) == "Func"))?
                .value;
            (func.kind() == "func_literal")
                .then(|| func.child_by_field_name("body"))
                .flatten()
                .map(|block| (site, block))
        }
        "call_expression" => {
            let (function, _) = ast::call_parts(expr)?;
            let (target, callee) = resolver.callee(site, function)?;
            update_body(resolver, target, callee, depth + 1)
        }
        _ => None,
    }
}

/// Publishes [`TypedResources`] for each package.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypedResourceAnalyzer;

impl Analyzer for TypedResourceAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn doc(&self) -> &'static str {
        "extract typed resources, their lifecycle methods and model mappings"
    }

    fn requires(&self) -> &'static [&'static str] {
        &[common::NAME]
    }

    fn reports(&self) -> bool {
        false
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(common) = pass.fact::<Arc<CommonSchemas>>(common::NAME) else {
            return Ok(None);
        };
        let resources = TypedResources::collect(pass.package(), pass.registry(), common);
        Ok(Some(Box::new(resources)))
    }
}
