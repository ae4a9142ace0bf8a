//! Tier 2: schemas returned by the vendored `commonschema` helpers.
//!
//! The helper package is read once per cache. The population path takes
//! the write lock and re-checks, so concurrent passes never load it twice;
//! an empty result is not stored, so a later pass that can see the vendor
//! directory gets another try.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use resource_lint_core::{AnalysisError, Analyzer, Fact, LintContext, Pass};
use resource_lint_go::package::decl_name;
use resource_lint_go::{ast, GoPackage, PackageLoader};
use tracing::{debug, info, warn};

use crate::resolve::{return_expression, Resolved, Resolver, Site};
use crate::SchemaInfo;

/// Import path of the shared schema-fragment library.
pub const COMMON_SCHEMA_PACKAGE: &str =
    "github.com/hashicorp/go-azure-helpers/resourcemanager/commonschema";

/// Analyzer name.
pub const NAME: &str = "schema-common";

/// Schemas keyed by `importPath.FunctionName`.
#[derive(Debug, Default)]
pub struct CommonSchemas {
    schemas: HashMap<String, SchemaInfo>,
}

impl CommonSchemas {
    /// Extracts every exported function of `package` that returns a
    /// `Schema` literal, directly, through `&` or through a local variable.
    #[must_use]
    pub fn from_package(package: &GoPackage, resolver: &Resolver<'_>) -> Self {
        let mut schemas = HashMap::new();
        for file in package.files().iter().filter(|f| !f.is_test()) {
            for decl in ast::named_children(file.root()) {
                if decl.kind() != "function_declaration" {
                    continue;
                }
                let Some(name) = decl_name(file, decl) else {
                    continue;
                };
                if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
                    continue;
                }
                let Some(expr) = return_expression(decl) else {
                    continue;
                };
                if let Some(Resolved::Schema(info)) = resolver.resolve(Site::new(package, file), expr) {
                    schemas.insert(format!("{}.{}", package.import_path(), name), info);
                }
            }
        }
        debug!(
            "Extracted {} common schema(s) from {}",
            schemas.len(),
            package.import_path()
        );
        Self { schemas }
    }

    /// Schema returned by `import_path.function`.
    #[must_use]
    pub fn get(&self, import_path: &str, function: &str) -> Option<&SchemaInfo> {
        self.schemas.get(&format!("{import_path}.{function}"))
    }

    /// Number of known functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Write-once cache of [`CommonSchemas`].
#[derive(Debug, Default)]
pub struct CommonSchemaCache {
    slot: RwLock<Option<Arc<CommonSchemas>>>,
}

impl CommonSchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached schemas, populating them with `populate` on first use.
    ///
    /// An empty population is returned but not stored.
    pub fn get_or_populate(&self, populate: impl FnOnce() -> CommonSchemas) -> Arc<CommonSchemas> {
        if let Some(cached) = self.cached() {
            return cached;
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = slot.as_ref() {
            return Arc::clone(cached);
        }
        let schemas = Arc::new(populate());
        if schemas.is_empty() {
            debug!("No common schemas found, not caching");
        } else {
            *slot = Some(Arc::clone(&schemas));
        }
        schemas
    }

    /// Cached schemas, if populated.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<CommonSchemas>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }
}

/// Loads the vendored `commonschema` package and publishes its schemas.
///
/// Fact: `Arc<CommonSchemas>`, empty when the package cannot be found.
#[derive(Debug, Default, Clone)]
pub struct CommonSchemaAnalyzer {
    cache: Arc<CommonSchemaCache>,
}

impl CommonSchemaAnalyzer {
    /// Creates the analyzer with its own cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares `cache` with other analyzer instances.
    #[must_use]
    pub fn with_cache(cache: Arc<CommonSchemaCache>) -> Self {
        Self { cache }
    }
}

impl Analyzer for CommonSchemaAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn doc(&self) -> &'static str {
        "extract schemas returned by the vendored commonschema helpers"
    }

    fn reports(&self) -> bool {
        false
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let ctx = pass.context();
        let schemas = self.cache.get_or_populate(|| populate(ctx));
        Ok(Some(Box::new(schemas)))
    }
}

fn populate(ctx: &LintContext) -> CommonSchemas {
    let resolver = Resolver::local(&ctx.registry);
    if let Some(package) = ctx.registry.get(COMMON_SCHEMA_PACKAGE) {
        return CommonSchemas::from_package(package, &resolver);
    }

    let Some(module) = &ctx.module else {
        debug!("No module to locate {} from", COMMON_SCHEMA_PACKAGE);
        return CommonSchemas::default();
    };
    let Some(dir) = module.dir_for_import(COMMON_SCHEMA_PACKAGE) else {
        debug!("{} is not vendored", COMMON_SCHEMA_PACKAGE);
        return CommonSchemas::default();
    };

    let loader = PackageLoader::new(module.clone(), module.root());
    match loader.load_package_dir(&dir, COMMON_SCHEMA_PACKAGE) {
        Ok(Some(package)) => {
            let schemas = CommonSchemas::from_package(&package, &resolver);
            info!("Loaded {} common schema(s)", schemas.len());
            schemas
        }
        Ok(None) => CommonSchemas::default(),
        Err(errors) => {
            for error in errors {
                warn!("Failed to load {}: {}", COMMON_SCHEMA_PACKAGE, error);
            }
            CommonSchemas::default()
        }
    }
}
