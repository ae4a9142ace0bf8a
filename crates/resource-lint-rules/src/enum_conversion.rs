//! Check for `pointer.To(Enum(v))` conversions.
//!
//! # Rationale
//!
//! `pointer.ToEnum[T](v)` converts and takes the address in one step and
//! keeps the enum type visible at the call site.
//!
//! # Detected Patterns
//!
//! - `pointer.To(pkg.T(v))` where `T` is an SDK enum: its underlying type
//!   is a string or integer, and its package declares
//!   `PossibleValuesForT()` or declares `T` in `constants.go`
//!
//! Only calls on the `go-azure-helpers/lang/pointer` package count; the
//! alias it is imported under does not matter.

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_go::ast::{self, Walk};
use resource_lint_go::{GoFile, GoPackage, Node, PackageRegistry};

use crate::POINTER_PACKAGE;

/// Check code.
pub const CODE: &str = "AZBP003";

/// Underlying types an SDK enum may have.
const ENUM_UNDERLYING: &[&str] = &[
    "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32",
    "uint64",
];

/// Flags `pointer.To` wrapped around an enum conversion.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumConversion;

impl EnumConversion {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// A `pointer.To(T(v))` match.
struct Finding<'t> {
    call: Node<'t>,
    pointer_alias: &'t str,
    enum_type: &'t str,
    value: &'t str,
}

fn find<'t>(registry: &PackageRegistry, package: &GoPackage, file: &'t GoFile) -> Vec<Finding<'t>> {
    let mut out = Vec::new();
    ast::walk(file.root(), |node| {
        if let Some(finding) = match_call(registry, package, file, node) {
            out.push(finding);
        }
        Walk::Continue
    });
    out
}

fn match_call<'t>(
    registry: &PackageRegistry,
    package: &GoPackage,
    file: &'t GoFile,
    call: Node<'t>,
) -> Option<Finding<'t>> {
    let (function, args) = ast::call_parts(call)?;
    let (alias, method) = ast::selector_parts(function)?;
    if alias.kind() != "identifier" || file.text(method) != "To" || args.len() != 1 {
        return None;
    }
    let pointer_alias = file.text(alias);
    if registry.resolve_import(file, pointer_alias) != Some(POINTER_PACKAGE) {
        return None;
    }

    let (conversion, inner) = ast::call_parts(ast::unwrap_expr(args[0]))?;
    if inner.len() != 1 || !is_enum(registry, package, file, conversion) {
        return None;
    }
    Some(Finding {
        call,
        pointer_alias,
        enum_type: file.text(conversion),
        value: file.text(inner[0]),
    })
}

/// Whether the callee of a conversion names an SDK enum type.
fn is_enum(registry: &PackageRegistry, package: &GoPackage, file: &GoFile, conversion: Node<'_>) -> bool {
    let (owner, name) = match conversion.kind() {
        "identifier" => (package, file.text(conversion)),
        "selector_expression" => {
            let Some((qualifier, name)) = ast::selector_parts(conversion) else {
                return false;
            };
            let owner = registry
                .resolve_import(file, file.text(qualifier))
                .and_then(|path| registry.get(path));
            match owner {
                Some(owner) => (owner.as_ref(), file.text(name)),
                None => return false,
            }
        }
        _ => return false,
    };

    let Some((decl_file, spec)) = owner.find_type(name) else {
        return false;
    };
    let basic = spec
        .child_by_field_name("type")
        .filter(|ty| ty.kind() == "type_identifier")
        .is_some_and(|ty| ENUM_UNDERLYING.contains(&decl_file.text(ty)));
    basic
        && (owner.has_function(&format!("PossibleValuesFor{name}"))
            || decl_file.file_name() == "constants.go")
}

impl Analyzer for EnumConversion {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for pointer.To around an enum conversion\n\n\
         `pointer.To(pkg.Enum(v))` should be written `pointer.ToEnum[pkg.Enum](v)`."
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let package = pass.package();
        for file in package.files().iter().filter(|f| !f.is_test()) {
            for finding in find(pass.registry(), package, file) {
                let replacement = format!(
                    "{}.ToEnum[{}]({})",
                    finding.pointer_alias, finding.enum_type, finding.value
                );
                pass.report_with_suggestion(
                    file,
                    finding.call,
                    format!(
                        "use `{replacement}` instead of `{}`",
                        file.text(finding.call)
                    ),
                    Suggestion::with_replacement("convert with pointer.ToEnum", replacement),
                );
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{registry, run};
    use resource_lint_core::Violation;

    const SDK: &str = "github.com/hashicorp/go-azure-sdk/resource-manager/web/2023-01-01/webapps";

    const MODELS: &str = r#"package webapps

type SkuName string

const (
	SkuNameBasic    SkuName = "Basic"
	SkuNameStandard SkuName = "Standard"
)

func PossibleValuesForSkuName() []string {
	return []string{string(SkuNameBasic), string(SkuNameStandard)}
}

type Properties struct {
	Name string
}
"#;

    const CONSTANTS: &str = r#"package webapps

type Tier int64
"#;

    fn check_code(code: &str) -> Vec<Violation> {
        let mut registry = registry(&[("web_app_resource.go", code)]);
        registry.insert(
            GoPackage::from_sources(SDK, &[("model_sku.go", MODELS), ("constants.go", CONSTANTS)])
                .expect("sdk"),
        );
        let violations = run(CODE, registry, None);
        assert!(violations.iter().all(|v| v.analyzer == CODE));
        violations
    }

    fn source(body: &str) -> String {
        format!(
            "package web\n\nimport (\n\t\"github.com/hashicorp/go-azure-helpers/lang/pointer\"\n\t\"{SDK}\"\n)\n\nfunc expand(v string) {{\n{body}\n}}\n"
        )
    }

    #[test]
    fn test_detects_enum_with_possible_values() {
        let violations = check_code(&source("\t_ = pointer.To(webapps.SkuName(v))"));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 9);
        let suggestion = violations[0].suggestion.as_ref().expect("suggestion");
        assert_eq!(
            suggestion.replacement.as_deref(),
            Some("pointer.ToEnum[webapps.SkuName](v)")
        );
    }

    #[test]
    fn test_detects_enum_declared_in_constants_file() {
        let violations = check_code(&source("\t_ = pointer.To(webapps.Tier(3))"));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_allows_non_enum_conversions() {
        let violations = check_code(&source(
            "\t_ = pointer.To(string(v))\n\t_ = pointer.To(webapps.Properties{Name: v})\n\t_ = pointer.To(webapps.SkuName(v), 1)",
        ));
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_requires_pointer_package() {
        let code = format!(
            "package web\n\nimport (\n\tpointer \"example.com/other/pointer\"\n\t\"{SDK}\"\n)\n\nfunc expand(v string) {{\n\t_ = pointer.To(webapps.SkuName(v))\n}}\n"
        );
        assert!(check_code(&code).is_empty());
    }
}
