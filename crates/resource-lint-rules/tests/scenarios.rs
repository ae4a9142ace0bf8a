//! End-to-end scenarios: the full catalogue over small packages.

use resource_lint_changes::parse_unified_diff;
use resource_lint_core::{AnalyzerGraph, LintContext, Violation};
use resource_lint_go::{GoPackage, PackageRegistry};
use resource_lint_rules::{all_analyzers, LICENSE_HEADER};

const PKG: &str = "example.com/provider/internal/services/web";

fn lint(sources: &[(&str, &str)], checks: &[&str]) -> Vec<Violation> {
    let mut registry = PackageRegistry::new();
    registry.insert(GoPackage::from_sources(PKG, sources).expect("package"));
    let graph = AnalyzerGraph::build(all_analyzers(), checks).expect("graph");
    graph
        .run(&LintContext::new(registry), &[PKG.to_owned()])
        .violations
}

fn by(violations: &[Violation], analyzer: &str) -> Vec<Violation> {
    violations
        .iter()
        .filter(|v| v.analyzer == analyzer)
        .cloned()
        .collect()
}

fn with_header(body: &str) -> String {
    format!("{LICENSE_HEADER}\n\n{body}")
}

#[test]
fn unvalidated_name_is_reported_once() {
    let source = with_header(
        r#"package web

var s = map[string]*pluginsdk.Schema{
	"name": {
		Type:     pluginsdk.TypeString,
		Required: true,
	},
}
"#,
    );
    let violations = lint(&[("web_app_resource.go", source.as_str())], &[]);
    let found = by(&violations, "AZBP001");
    assert_eq!(found.len(), 1);
    assert!(found[0].message.contains("`name`"));
    assert!(by(&violations, "AZBP005").is_empty());
}

#[test]
fn undocumented_optional_computed_is_reported_once() {
    let source = with_header(
        r#"package web

var s = map[string]*pluginsdk.Schema{
	"etag": {
		Type:         pluginsdk.TypeString,
		Optional:     true,
		Computed:     true,
		ValidateFunc: validation.StringIsNotEmpty,
	},
}
"#,
    );
    let violations = lint(&[("web_app_resource.go", source.as_str())], &[]);
    assert_eq!(by(&violations, "AZBP002").len(), 1);
    assert!(by(&violations, "AZBP001").is_empty());
}

#[test]
fn errorf_without_verbs() {
    let source = |call: &str| {
        with_header(&format!(
            "package web\n\nimport \"fmt\"\n\nfunc f(err error) error {{\n\treturn {call}\n}}\n"
        ))
    };
    let constant = source("fmt.Errorf(\"failed\")");
    let formatted = source("fmt.Errorf(\"failed: %v\", err)");

    assert_eq!(lint(&[("client.go", constant.as_str())], &["AZRE001"]).len(), 1);
    assert!(lint(&[("client.go", formatted.as_str())], &["AZRE001"]).is_empty());
}

#[test]
fn license_header_present_and_missing() {
    let body = "package web\n\nfunc f() {}\n";
    let present = with_header(body);

    assert!(lint(&[("client.go", present.as_str())], &["AZBP005"]).is_empty());
    assert_eq!(lint(&[("client.go", body)], &["AZBP005"]).len(), 1);
}

#[test]
fn config_disables_and_reclassifies_checks() {
    let source = r#"package web

var s = map[string]*pluginsdk.Schema{
	"name": {Type: pluginsdk.TypeString, Required: true},
}
"#;
    let mut registry = PackageRegistry::new();
    registry.insert(GoPackage::from_sources(PKG, &[("web_app_resource.go", source)]).expect("package"));
    let config = resource_lint_core::Config::parse(
        "[rules.AZBP005]\nenabled = false\n\n[rules.AZBP001]\nseverity = \"error\"\n",
    )
    .expect("config");
    let graph = AnalyzerGraph::build(all_analyzers(), &[]).expect("graph");
    let result = graph.run(
        &LintContext::new(registry).with_config(config),
        &[PKG.to_owned()],
    );

    assert!(by(&result.violations, "AZBP005").is_empty());
    let found = by(&result.violations, "AZBP001");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, resource_lint_core::Severity::Error);
}

#[test]
fn change_set_limits_reports_to_added_lines() {
    let source = r#"package web

var s = map[string]*pluginsdk.Schema{
	"name": {Type: pluginsdk.TypeString, Required: true},
	"kind": {Type: pluginsdk.TypeString, Optional: true},
}
"#;
    let mut registry = PackageRegistry::new();
    registry.insert(GoPackage::from_sources(PKG, &[("web_app_resource.go", source)]).expect("package"));
    let path = "internal/services/web/web_app_resource.go";
    let diff = format!(
        "diff --git a/{path} b/{path}\nindex 1111111..2222222 100644\n--- a/{path}\n+++ b/{path}\n@@ -4,0 +5,1 @@\n+\t\"kind\": {{Type: pluginsdk.TypeString, Optional: true}},\n"
    );
    let changes = parse_unified_diff(&diff, "internal/services/")
        .expect("diff")
        .changes;

    let graph = AnalyzerGraph::build(all_analyzers(), &[]).expect("graph");
    let result = graph.run(
        &LintContext::new(registry).with_changes(Some(changes)),
        &[PKG.to_owned()],
    );

    let rendered: Vec<String> = result.violations.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(
        rendered.join("\n"),
        @"web_app_resource.go:5:2: AZBP001: string attribute `kind` must have a ValidateFunc"
    );
}
