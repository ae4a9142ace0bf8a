//! # resource-lint-schema
//!
//! Extraction of Terraform schema definitions from provider sources.
//!
//! The checks never look at raw syntax for schemas; they read the facts
//! published by the analyzers in this crate:
//!
//! | Analyzer | Fact | Contents |
//! |----------|------|----------|
//! | `schema-local` | [`LocalSchemas`] | schema maps and standalone schemas declared in the package, calls left unresolved |
//! | `schema-common` | `Arc<CommonSchemas>` | schemas returned by the vendored `commonschema` helpers |
//! | `schema-complete` | [`CompleteSchemas`] | schema maps with calls followed across packages |
//! | `typed-resource` | [`TypedResources`] | typed resources, lifecycle methods and model mappings |
//!
//! Resolution is purely syntactic. Maps built at runtime (loops, feature
//! flags) come out incomplete; consumers check [`SchemaMap::is_complete`]
//! and skip rather than guess.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod common;
pub mod complete;
pub mod filter;
pub mod literal;
pub mod local;
pub mod model;
pub mod resolve;
pub mod typed;

pub use common::{CommonSchemaAnalyzer, CommonSchemaCache, CommonSchemas, COMMON_SCHEMA_PACKAGE};
pub use complete::{CompleteSchemaAnalyzer, CompleteSchemas};
pub use local::{LocalSchemaAnalyzer, LocalSchemas};
pub use model::{FlagSite, SchemaElem, SchemaField, SchemaInfo, SchemaMap, SchemaType, UnresolvedKey};
pub use resolve::{Resolved, Resolver, SchemaExpr, Site};
pub use typed::{ModelField, TypedResourceAnalyzer, TypedResourceInfo, TypedResources};

use resource_lint_core::AnalyzerBox;

/// The extraction analyzers, to be registered ahead of the checks.
#[must_use]
pub fn extraction_analyzers() -> Vec<AnalyzerBox> {
    vec![
        Box::new(LocalSchemaAnalyzer),
        Box::new(CommonSchemaAnalyzer::new()),
        Box::new(CompleteSchemaAnalyzer),
        Box::new(TypedResourceAnalyzer),
    ]
}
