//! # resource-lint-rules
//!
//! Provider convention checks for resource-lint.
//!
//! Schema checks consume the facts published by `resource-lint-schema`;
//! the rest work directly on the syntax tree of each file.
//!
//! ## Available Checks
//!
//! | Code | Requires | Description |
//! |------|----------|-------------|
//! | AZBP001 | `schema-local` | String attributes must declare a validation function |
//! | AZBP002 | `schema-local` | Optional+Computed order and `NOTE: O+C` comment |
//! | AZBP003 | | `pointer.To(Enum(v))` should be `pointer.ToEnum[Enum](v)` |
//! | AZBP004 | | Zero value plus nil-checked dereference should be `pointer.From` |
//! | AZBP005 | | Files start with the license header |
//! | AZSD001 | `schema-local` | `MaxItems: 1` blocks with a single property |
//! | AZSD002 | `schema-local` | Optional-only blocks need `AtLeastOneOf` |
//! | AZRN001 | `schema-local` | `_in_percent` names should use `_percentage` |
//! | AZRE001 | | `fmt.Errorf` with a constant string should be `errors.New` |
//! | AZNR001 | `schema-complete` | Schema field ordering in new files |
//! | AZNR002 | `typed-resource` | Updatable properties handled in `Update()` |
//! | AZNR003 | `typed-resource` | expand/flatten helpers outside the resource file |
//!
//! ## Usage
//!
//! ```ignore
//! use resource_lint_core::{AnalyzerGraph, LintContext};
//! use resource_lint_rules::all_analyzers;
//!
//! let graph = AnalyzerGraph::build(all_analyzers(), &["AZBP001", "AZNR001"])?;
//! let result = graph.run(&LintContext::new(registry), &roots);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod at_least_one_of;
mod catalogue;
mod enum_conversion;
mod expand_flatten;
mod field_order;
mod fixed_error_string;
mod license_header;
mod max_items_one;
mod optional_computed;
mod percent_naming;
mod pointer_from;
mod string_validation;
mod update_coverage;

pub use at_least_one_of::AtLeastOneOf;
pub use catalogue::{all_analyzers, all_checks};
pub use enum_conversion::EnumConversion;
pub use expand_flatten::ExpandFlattenPlacement;
pub use field_order::{expected_order, FieldOrder};
pub use fixed_error_string::FixedErrorString;
pub use license_header::{LicenseHeader, LICENSE_HEADER};
pub use max_items_one::MaxItemsOne;
pub use optional_computed::OptionalComputed;
pub use percent_naming::PercentNaming;
pub use pointer_from::PointerFrom;
pub use string_validation::StringValidation;
pub use update_coverage::UpdateCoverage;

/// Re-export core types for convenience.
pub use resource_lint_core::{Analyzer, Severity, Violation};

use resource_lint_core::{Pass, Suggestion};
use resource_lint_go::{FileKey, Position};
use resource_lint_schema::{LocalSchemas, SchemaInfo};

/// Import path of the go-azure-helpers pointer package.
pub(crate) const POINTER_PACKAGE: &str = "github.com/hashicorp/go-azure-helpers/lang/pointer";

/// One schema literal from the local tier: a map entry or a standalone
/// `&Schema{...}`.
pub(crate) struct Declared<'a> {
    pub name: Option<&'a str>,
    pub info: &'a SchemaInfo,
    pub file: FileKey,
    pub position: Position,
}

/// Map entries of every local map (nested ones included), then the
/// standalone schemas.
pub(crate) fn declared(local: &LocalSchemas) -> impl Iterator<Item = Declared<'_>> {
    let entries = local.maps.iter().flat_map(|map| {
        map.fields.iter().map(|field| Declared {
            name: Some(field.name.as_str()),
            info: &field.info,
            file: field.file,
            position: field.key_position,
        })
    });
    let standalone = local.schemas.iter().filter_map(|info| {
        Some(Declared {
            name: None,
            info,
            file: info.file?,
            position: info.position,
        })
    });
    entries.chain(standalone)
}

/// Reports in a file of the package under analysis, looked up by key.
pub(crate) fn report_in(
    pass: &mut Pass<'_>,
    file: FileKey,
    position: Position,
    message: impl Into<String>,
    suggestion: Option<Suggestion>,
) {
    if let Some(file) = pass.package().file(file) {
        pass.report_at(file, position, message, suggestion);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use resource_lint_changes::ChangeSet;
    use resource_lint_core::{AnalyzerGraph, LintContext, Violation};
    use resource_lint_go::{GoPackage, PackageRegistry};

    use crate::all_analyzers;

    /// Import path of the package under test.
    pub const PKG: &str = "example.com/provider/internal/services/web";

    pub fn registry(sources: &[(&str, &str)]) -> PackageRegistry {
        let mut registry = PackageRegistry::new();
        registry.insert(GoPackage::from_sources(PKG, sources).expect("package"));
        registry
    }

    /// Runs the check `code` over a registry whose root is [`PKG`].
    pub fn run(code: &str, registry: PackageRegistry, changes: Option<ChangeSet>) -> Vec<Violation> {
        let graph = AnalyzerGraph::build(all_analyzers(), &[code]).expect("graph");
        let ctx = LintContext::new(registry).with_changes(changes);
        graph.run(&ctx, &[PKG.to_owned()]).violations
    }

    /// Runs the check `code` over one package, unfiltered.
    pub fn check(code: &str, sources: &[(&str, &str)]) -> Vec<Violation> {
        run(code, registry(sources), None)
    }

    /// Runs the check `code` over a single `web_app_resource.go`.
    pub fn check_file(code: &str, source: &str) -> Vec<Violation> {
        check(code, &[("web_app_resource.go", source)])
    }
}
