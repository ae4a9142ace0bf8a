//! Tier 1: schema literals declared in the package itself.

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass};
use resource_lint_go::ast::{self, Walk};
use resource_lint_go::{GoFile, GoPackage, PackageRegistry};
use tracing::debug;

use crate::filter::schema_files;
use crate::literal::{
    is_conditional, is_elem_value, is_map_entry_value, is_schema_map_type, is_schema_type,
    literal_type,
};
use crate::model::{SchemaInfo, SchemaMap};
use crate::resolve::{Resolver, Site};

/// Analyzer name.
pub const NAME: &str = "schema-local";

/// Schema literals found by walking one package.
#[derive(Debug, Default)]
pub struct LocalSchemas {
    /// Every `map[string]*Schema` literal, nested ones included. Entries
    /// whose value is a call are counted as unresolved.
    pub maps: Vec<SchemaMap>,
    /// `&Schema{...}` literals that are neither map values nor `Elem`s.
    pub schemas: Vec<SchemaInfo>,
}

impl LocalSchemas {
    /// Walks the schema files of `package`.
    #[must_use]
    pub fn collect(package: &GoPackage, registry: &PackageRegistry) -> Self {
        let resolver = Resolver::local(registry);
        let mut out = Self::default();
        for file in schema_files(package) {
            out.collect_file(&resolver, Site::new(package, file), file);
        }
        out
    }

    fn collect_file<'a>(&mut self, resolver: &Resolver<'a>, site: Site<'a>, file: &'a GoFile) {
        ast::walk(file.root(), |node| {
            if node.kind() != "composite_literal" {
                return Walk::Continue;
            }
            let Some(ty) = literal_type(node) else {
                return Walk::Continue;
            };
            if is_conditional(node) {
                debug!(
                    "Skipping conditional schema at {}:{}",
                    file.display_path().display(),
                    file.position(node).line
                );
                return Walk::Skip;
            }
            if is_schema_map_type(file, ty) {
                self.maps.push(resolver.schema_map(site, node));
            } else if is_schema_type(file, ty)
                && !is_elem_value(file, node)
                && !is_map_entry_value(file, node)
            {
                self.schemas.push(resolver.schema(site, node));
            }
            Walk::Continue
        });
    }
}

/// Collects [`LocalSchemas`] for each package.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSchemaAnalyzer;

impl Analyzer for LocalSchemaAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn doc(&self) -> &'static str {
        "collect schema literals declared in the package"
    }

    fn reports(&self) -> bool {
        false
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let schemas = LocalSchemas::collect(pass.package(), pass.registry());
        debug!(
            "{}: {} schema map(s), {} standalone schema(s)",
            pass.package().import_path(),
            schemas.maps.len(),
            schemas.schemas.len()
        );
        Ok(Some(Box::new(schemas)))
    }
}
