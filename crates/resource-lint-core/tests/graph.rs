//! Integration test: graph construction and execution with small analyzers.

use resource_lint_changes::{parse_unified_diff, SERVICE_PATH_PREFIX};
use resource_lint_core::{
    AnalysisError, Analyzer, AnalyzerBox, AnalyzerGraph, Config, Fact, LintContext, Pass,
    Severity,
};
use resource_lint_go::ast::{self, Walk};
use resource_lint_go::{GoPackage, PackageRegistry};

const PKG: &str = "example.com/provider/internal/services/web";

/// Collects the lines of every `call_expression`.
struct Calls;

impl Analyzer for Calls {
    fn name(&self) -> &'static str {
        "calls"
    }
    fn doc(&self) -> &'static str {
        "collect call sites"
    }
    fn reports(&self) -> bool {
        false
    }
    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let mut lines: Vec<(usize, usize)> = Vec::new();
        for (i, file) in pass.package().files().iter().enumerate() {
            ast::walk(file.root(), |n| {
                if n.kind() == "call_expression" {
                    lines.push((i, n.start_position().row + 1));
                }
                Walk::Continue
            });
        }
        Ok(Some(Box::new(lines)))
    }
}

/// Reports every call collected by [`Calls`].
struct ReportCalls;

impl Analyzer for ReportCalls {
    fn name(&self) -> &'static str {
        "TEST001"
    }
    fn doc(&self) -> &'static str {
        "report call sites"
    }
    fn requires(&self) -> &'static [&'static str] {
        &["calls"]
    }
    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let Some(calls) = pass.fact::<Vec<(usize, usize)>>("calls") else {
            return Ok(None);
        };
        for &(i, line) in calls {
            let file = &pass.package().files()[i];
            pass.report_at(
                file,
                resource_lint_go::Position { line, column: 1 },
                "call",
                None,
            );
        }
        Ok(None)
    }
}

/// Always fails.
struct Broken;

impl Analyzer for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }
    fn doc(&self) -> &'static str {
        "fails"
    }
    fn reports(&self) -> bool {
        false
    }
    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        Err(AnalysisError::Failed {
            analyzer: self.name().to_owned(),
            package: pass.package().import_path().to_owned(),
            message: "boom".to_owned(),
        })
    }
}

/// Requires [`Broken`], so never runs.
struct NeedsBroken;

impl Analyzer for NeedsBroken {
    fn name(&self) -> &'static str {
        "TEST002"
    }
    fn doc(&self) -> &'static str {
        "depends on a failing analyzer"
    }
    fn requires(&self) -> &'static [&'static str] {
        &["broken"]
    }
    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        let file = &pass.package().files()[0];
        pass.report(file, file.root(), "should never appear");
        Ok(None)
    }
}

struct Cyclic(&'static str, &'static [&'static str]);

impl Analyzer for Cyclic {
    fn name(&self) -> &'static str {
        self.0
    }
    fn doc(&self) -> &'static str {
        "cyclic"
    }
    fn requires(&self) -> &'static [&'static str] {
        self.1
    }
    fn run(&self, _pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        Ok(None)
    }
}

fn catalogue() -> Vec<AnalyzerBox> {
    vec![
        Box::new(ReportCalls),
        Box::new(NeedsBroken),
        Box::new(Calls),
        Box::new(Broken),
    ]
}

fn context() -> LintContext {
    let mut registry = PackageRegistry::new();
    registry.insert(
        GoPackage::from_sources(
            PKG,
            &[(
                "app.go",
                "package web\n\nfunc a() {\n\tfoo()\n\tbar() //lintignore:TEST001\n\tbaz()\n}\n",
            )],
        )
        .expect("package"),
    );
    LintContext::new(registry)
}

fn lines(result: &resource_lint_core::LintResult) -> Vec<usize> {
    result.violations.iter().map(|v| v.location.line).collect()
}

#[test]
fn requirements_run_first_and_feed_facts() {
    let graph = AnalyzerGraph::build(catalogue(), &["TEST001"]).expect("graph");
    let names: Vec<&str> = graph.analyzers().map(|a| a.name()).collect();
    assert_eq!(names, vec!["calls", "TEST001"]);

    let result = graph.run(&context(), &[PKG.to_owned()]);
    assert_eq!(lines(&result), vec![4, 6], "line 5 carries a lintignore");
    assert_eq!(result.packages_checked, 1);
    assert_eq!(result.violations[0].severity, Severity::Warning);
    assert_eq!(result.violations[0].analyzer, "TEST001");
}

#[test]
fn empty_selection_runs_every_reporting_analyzer() {
    let graph = AnalyzerGraph::build(catalogue(), &[]).expect("graph");
    assert!(graph.is_selected("TEST001"));
    assert!(graph.is_selected("TEST002"));
    assert!(!graph.is_selected("calls"));

    let result = graph.run(&context(), &[PKG.to_owned()]);
    assert!(result.violations.iter().all(|v| v.analyzer == "TEST001"));
}

#[test]
fn change_set_limits_reported_lines() {
    let diff = "diff --git a/internal/services/web/app.go b/internal/services/web/app.go\n\
         --- a/internal/services/web/app.go\n\
         +++ b/internal/services/web/app.go\n\
         @@ -5,0 +6,1 @@\n\
         +\tbaz()\n";
    let changes = parse_unified_diff(diff, SERVICE_PATH_PREFIX)
        .expect("diff")
        .changes;
    let ctx = context().with_changes(Some(changes));

    let graph = AnalyzerGraph::build(catalogue(), &["TEST001"]).expect("graph");
    assert_eq!(lines(&graph.run(&ctx, &[PKG.to_owned()])), vec![6]);
}

#[test]
fn config_disables_and_overrides_severity() {
    let graph = AnalyzerGraph::build(catalogue(), &["TEST001"]).expect("graph");

    let disabled = Config::parse("[rules.TEST001]\nenabled = false\n").expect("config");
    let result = graph.run(&context().with_config(disabled), &[PKG.to_owned()]);
    assert!(result.violations.is_empty());

    let errors = Config::parse("[rules.TEST001]\nseverity = \"error\"\n").expect("config");
    let result = graph.run(&context().with_config(errors), &[PKG.to_owned()]);
    assert!(result.violations.iter().all(|v| v.severity == Severity::Error));
}

#[test]
fn failed_requirement_silences_dependents() {
    let graph = AnalyzerGraph::build(catalogue(), &["TEST002"]).expect("graph");
    let result = graph.run(&context(), &[PKG.to_owned()]);
    assert!(result.violations.is_empty());
}

#[test]
fn unknown_and_cyclic_graphs_are_rejected() {
    assert!(matches!(
        AnalyzerGraph::build(catalogue(), &["NOPE001"]),
        Err(AnalysisError::UnknownAnalyzer(name)) if name == "NOPE001"
    ));

    let cyclic: Vec<AnalyzerBox> = vec![
        Box::new(Cyclic("A001", &["b"])),
        Box::new(Cyclic("b", &["c"])),
        Box::new(Cyclic("c", &["b"])),
    ];
    assert!(matches!(
        AnalyzerGraph::build(cyclic, &[]),
        Err(AnalysisError::Cycle(_))
    ));

    let dangling: Vec<AnalyzerBox> = vec![Box::new(Cyclic("A001", &["missing"]))];
    assert!(matches!(
        AnalyzerGraph::build(dangling, &[]),
        Err(AnalysisError::UnknownAnalyzer(name)) if name == "missing"
    ));

    let duplicate: Vec<AnalyzerBox> = vec![Box::new(Calls), Box::new(Calls)];
    assert!(matches!(
        AnalyzerGraph::build(duplicate, &[]),
        Err(AnalysisError::Duplicate(_))
    ));
}

#[test]
fn unknown_root_package_is_skipped() {
    let graph = AnalyzerGraph::build(catalogue(), &["TEST001"]).expect("graph");
    let result = graph.run(&context(), &["example.com/provider/missing".to_owned()]);
    assert_eq!(result.packages_checked, 0);
}
