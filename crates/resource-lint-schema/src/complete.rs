//! Tier 3: schema maps with every call-valued entry followed.

use std::collections::HashMap;
use std::sync::Arc;

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass};
use resource_lint_go::ast::{self, Walk};
use resource_lint_go::{GoPackage, NodeRef, PackageRegistry};
use tracing::debug;

use crate::common::{self, CommonSchemas};
use crate::filter::schema_files;
use crate::literal::{is_conditional, is_schema_map_type, literal_type};
use crate::model::SchemaMap;
use crate::resolve::{Resolver, Site};

/// Analyzer name.
pub const NAME: &str = "schema-complete";

/// Fully resolved schema maps of one package, keyed by map literal.
#[derive(Debug, Default)]
pub struct CompleteSchemas {
    maps: Vec<SchemaMap>,
    index: HashMap<NodeRef, usize>,
}

impl CompleteSchemas {
    /// Resolves every schema map literal in the schema files of `package`.
    #[must_use]
    pub fn collect(package: &GoPackage, registry: &PackageRegistry, common: &CommonSchemas) -> Self {
        let resolver = Resolver::complete(registry, common);
        let mut out = Self::default();
        for file in schema_files(package) {
            let site = Site::new(package, file);
            ast::walk(file.root(), |node| {
                if node.kind() != "composite_literal" {
                    return Walk::Continue;
                }
                if is_conditional(node) {
                    return Walk::Skip;
                }
                if literal_type(node).is_some_and(|ty| is_schema_map_type(file, ty)) {
                    out.insert(resolver.schema_map(site, node));
                }
                Walk::Continue
            });
        }
        out
    }

    fn insert(&mut self, map: SchemaMap) {
        self.index.insert(map.id, self.maps.len());
        self.maps.push(map);
    }

    /// All maps in walk order.
    #[must_use]
    pub fn maps(&self) -> &[SchemaMap] {
        &self.maps
    }

    /// Map for the literal `id`.
    #[must_use]
    pub fn get(&self, id: &NodeRef) -> Option<&SchemaMap> {
        self.index.get(id).map(|&i| &self.maps[i])
    }
}

/// Publishes [`CompleteSchemas`] for each package.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompleteSchemaAnalyzer;

impl Analyzer for CompleteSchemaAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn doc(&self) -> &'static str {
        "resolve schema maps through helper functions and commonschema"
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
        let schemas = CompleteSchemas::collect(pass.package(), pass.registry(), common);
        debug!(
            "{}: {} complete schema map(s)",
            pass.package().import_path(),
            schemas.maps.len()
        );
        Ok(Some(Box::new(schemas)))
    }
}
