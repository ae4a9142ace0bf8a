//! The lint run: change loading, package loading, analysis.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use resource_lint_changes::{select_loader, ChangeSet, LoaderOptions};
use resource_lint_core::{AnalyzerGraph, Config, LintContext, LintResult};
use resource_lint_go::{GoModule, PackageLoader};
use resource_lint_rules::all_analyzers;
use tracing::{debug, info, warn};

use crate::config_resolver;

/// Command line inputs of a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Package patterns; derived from the change set when empty.
    pub patterns: Vec<String>,
    /// Disable change tracking.
    pub no_filter: bool,
    /// Git remote override.
    pub remote: Option<String>,
    /// Base branch override.
    pub base: Option<String>,
    /// Unified diff to read changes from.
    pub diff_file: Option<PathBuf>,
    /// GitHub pull request number.
    pub pr: Option<u64>,
    /// GitHub repository of the pull request.
    pub github_repo: Option<String>,
    /// GitHub API token.
    pub github_token: Option<String>,
    /// Checks to run; empty runs all.
    pub checks: Vec<String>,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

/// Runs the linter from the current directory.
///
/// # Errors
///
/// Returns an error for unreadable configuration, an explicitly requested
/// change source that fails, package load failures, and when no package
/// patterns are given or derivable.
pub fn run(options: &RunOptions) -> Result<LintResult> {
    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    let work_dir = dunce::canonicalize(&cwd)
        .with_context(|| format!("failed to resolve {}", cwd.display()))?;
    run_in(&work_dir, options)
}

fn run_in(work_dir: &Path, options: &RunOptions) -> Result<LintResult> {
    let module = GoModule::discover(work_dir).context("failed to find the Go module")?;
    let source = config_resolver::resolve(work_dir, module.root(), options.config.as_deref());
    let config = source.load()?;
    if let Some(path) = source.path() {
        info!("Using config {}", path.display());
    }

    let changes = load_changes(work_dir, options, &config)?;

    let (patterns, loader_cwd) = if options.patterns.is_empty() {
        (derived_patterns(&module, changes.as_ref())?, module.root().to_path_buf())
    } else {
        (options.patterns.clone(), work_dir.to_path_buf())
    };
    debug!("Package patterns: {:?}", patterns);

    let loader = PackageLoader::new(module.clone(), loader_cwd)
        .include_tests(config.analyzer.include_tests)
        .exclude(&config.analyzer.exclude)
        .context("invalid exclude pattern in config")?;
    let outcome = loader.load(&patterns).context("failed to load packages")?;
    if outcome.has_errors() {
        for error in &outcome.errors {
            eprintln!("{error}");
        }
        bail!("{} package load error(s)", outcome.errors.len());
    }
    if outcome.roots.is_empty() {
        bail!("no packages matched {}", patterns.join(" "));
    }

    let selected: Vec<&str> = options.checks.iter().map(String::as_str).collect();
    let graph = AnalyzerGraph::build(all_analyzers(), &selected)?;

    let ctx = LintContext::new(outcome.registry)
        .with_changes(changes)
        .with_config(config)
        .with_module(module);
    let result = graph.run(&ctx, &outcome.roots);
    let (errors, warnings, infos) = result.count_by_severity();
    info!(
        "Checked {} package(s), {} file(s): {} error(s), {} warning(s), {} info(s)",
        result.packages_checked, result.files_checked, errors, warnings, infos
    );
    Ok(result)
}

/// Resolves the change set. Failures of sources the user did not ask for
/// degrade to an unfiltered run.
fn load_changes(work_dir: &Path, options: &RunOptions, config: &Config) -> Result<Option<ChangeSet>> {
    let loader_options = LoaderOptions {
        no_filter: options.no_filter,
        diff_file: options.diff_file.clone(),
        pr: options.pr,
        github_repo: options.github_repo.clone(),
        github_token: options.github_token.clone(),
        remote: options.remote.clone(),
        base: options.base.clone(),
        default_base: config.changes.default_base.clone(),
        prefix: config.changes.service_prefix.clone(),
        work_dir: work_dir.to_path_buf(),
    };
    let Some(loader) = select_loader(&loader_options)? else {
        info!("Change filtering disabled, reporting every finding");
        return Ok(None);
    };

    info!("Loading changes from {}", loader.describe());
    match loader.load() {
        Ok(changes) => {
            info!("{} changed file(s)", changes.file_count());
            Ok(Some(changes))
        }
        Err(e) if loader.is_explicit() => Err(anyhow::Error::new(e)
            .context(format!("failed to load changes from {}", loader.describe()))),
        Err(e) => {
            warn!("{}; analyzing without change filtering", e);
            Ok(None)
        }
    }
}

/// `./<dir>` patterns for the service packages touched by `changes`,
/// relative to the module root.
fn derived_patterns(module: &GoModule, changes: Option<&ChangeSet>) -> Result<Vec<String>> {
    let Some(changes) = changes else {
        bail!("no package patterns given and change tracking is disabled");
    };
    let patterns: Vec<String> = changes
        .changed_packages()
        .into_iter()
        .filter(|dir| module.root().join(dir).is_dir())
        .map(|dir| format!("./{dir}"))
        .collect();
    if patterns.is_empty() {
        bail!("no package patterns given and no changed service packages found");
    }
    info!("Derived {} package pattern(s) from changes", patterns.len());
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_lint_changes::parse_unified_diff;
    use tempfile::TempDir;

    const DIFF: &str = "diff --git a/internal/services/web/web_app_resource.go b/internal/services/web/web_app_resource.go
new file mode 100644
--- /dev/null
+++ b/internal/services/web/web_app_resource.go
@@ -0,0 +1,1 @@
+package web
diff --git a/internal/services/gone/old.go b/internal/services/gone/old.go
--- a/internal/services/gone/old.go
+++ b/internal/services/gone/old.go
@@ -1,1 +1,2 @@
 package gone
+// edit
";

    fn module(dir: &Path) -> GoModule {
        GoModule::new(dir, "example.com/provider")
    }

    #[test]
    fn derives_patterns_for_existing_service_dirs() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("internal/services/web")).unwrap();
        let changes = parse_unified_diff(DIFF, "internal/services/").unwrap().changes;

        let patterns = derived_patterns(&module(tmp.path()), Some(&changes)).unwrap();
        assert_eq!(patterns, vec!["./internal/services/web".to_owned()]);
    }

    #[test]
    fn derivation_needs_changes() {
        let tmp = TempDir::new().unwrap();
        let err = derived_patterns(&module(tmp.path()), None).unwrap_err();
        assert!(err.to_string().contains("change tracking is disabled"));

        let changes = parse_unified_diff(DIFF, "internal/services/").unwrap().changes;
        let err = derived_patterns(&module(tmp.path()), Some(&changes)).unwrap_err();
        assert!(err.to_string().contains("no changed service packages"));
    }

    #[test]
    fn unreadable_diff_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let options = RunOptions {
            diff_file: Some(tmp.path().join("missing.patch")),
            ..RunOptions::default()
        };
        let err = load_changes(tmp.path(), &options, &Config::default()).unwrap_err();
        assert!(err.to_string().starts_with("failed to load changes from diff file"));
    }

    #[test]
    fn no_filter_skips_change_loading() {
        let tmp = TempDir::new().unwrap();
        let options = RunOptions {
            no_filter: true,
            diff_file: Some(tmp.path().join("missing.patch")),
            ..RunOptions::default()
        };
        assert!(load_changes(tmp.path(), &options, &Config::default())
            .unwrap()
            .is_none());
    }
}
