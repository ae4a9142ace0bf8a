//! Integration test: the `resource-lint` binary over a throwaway Go module.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const GO_MOD: &str = "module example.com/provider\n\ngo 1.22\n";

const RESOURCE: &str = r#"// Copyright (c) HashiCorp, Inc.
// SPDX-License-Identifier: MPL-2.0

package web

var s = map[string]*pluginsdk.Schema{
	"name": {
		Type:     pluginsdk.TypeString,
		Required: true,
	},
}
"#;

const FINDING: &str =
    "internal/services/web/web_app_resource.go:7:2: AZBP001: string attribute `name` must have a ValidateFunc";

fn provider() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let web = tmp.path().join("internal/services/web");
    fs::create_dir_all(&web).unwrap();
    fs::write(tmp.path().join("go.mod"), GO_MOD).unwrap();
    fs::write(web.join("web_app_resource.go"), RESOURCE).unwrap();
    tmp
}

fn lint(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_resource-lint"))
        .args(args)
        .current_dir(dir)
        .env("RESOURCE_LINT_CONFIG_DIR", dir.join("no-global-config"))
        .env_remove("RUST_LOG")
        .env_remove("GITHUB_TOKEN")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn unfiltered_run_reports_and_exits_one() {
    let tmp = provider();
    let output = lint(tmp.path(), &["--no-filter", "./internal/services/..."]);

    assert_eq!(output.status.code(), Some(1), "{}", stderr(&output));
    assert_eq!(stdout(&output), format!("{FINDING}\n1 issue(s) found\n"));
}

#[test]
fn clean_package_exits_zero() {
    let tmp = provider();
    let output = lint(
        tmp.path(),
        &["--no-filter", "--checks", "AZRE001,AZBP005", "./internal/services/web"],
    );

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");
}

#[test]
fn new_file_diff_derives_patterns() {
    let tmp = provider();
    let mut diff = String::from(
        "diff --git a/internal/services/web/web_app_resource.go b/internal/services/web/web_app_resource.go\n\
         new file mode 100644\n\
         --- /dev/null\n\
         +++ b/internal/services/web/web_app_resource.go\n\
         @@ -0,0 +1,11 @@\n",
    );
    for line in RESOURCE.lines() {
        diff.push('+');
        diff.push_str(line);
        diff.push('\n');
    }
    fs::write(tmp.path().join("changes.patch"), diff).unwrap();

    let output = lint(tmp.path(), &["--diff", "changes.patch"]);

    assert_eq!(output.status.code(), Some(1), "{}", stderr(&output));
    assert_eq!(stdout(&output), format!("{FINDING}\n1 issue(s) found\n"));
}

#[test]
fn findings_outside_changed_lines_are_dropped() {
    let tmp = provider();
    let diff = "diff --git a/internal/services/web/web_app_resource.go b/internal/services/web/web_app_resource.go
--- a/internal/services/web/web_app_resource.go
+++ b/internal/services/web/web_app_resource.go
@@ -8,0 +9,1 @@
+\t\tRequired: true,
";
    fs::write(tmp.path().join("changes.patch"), diff).unwrap();

    let output = lint(tmp.path(), &["--diff", "changes.patch", "./internal/services/web"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");
}

#[test]
fn project_config_disables_checks() {
    let tmp = provider();
    fs::write(
        tmp.path().join("resource-lint.toml"),
        "[rules.AZBP001]\nenabled = false\n",
    )
    .unwrap();

    let output = lint(tmp.path(), &["--no-filter", "./internal/services/web"]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn json_output_serializes_the_result() {
    let tmp = provider();
    let output = lint(
        tmp.path(),
        &["--no-filter", "--format", "json", "./internal/services/web"],
    );

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["packages_checked"], 1);
    assert_eq!(json["violations"][0]["analyzer"], "AZBP001");
    assert_eq!(json["violations"][0]["severity"], "warning");
    assert_eq!(json["violations"][0]["location"]["line"], 7);
}

#[test]
fn missing_patterns_without_changes_is_a_tool_error() {
    let tmp = provider();
    let output = lint(tmp.path(), &["--no-filter"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("no package patterns given"));
}

#[test]
fn broken_package_is_a_tool_error() {
    let tmp = provider();
    fs::write(
        tmp.path().join("internal/services/web/broken.go"),
        "package web\n\nfunc broken( {\n",
    )
    .unwrap();

    let output = lint(tmp.path(), &["--no-filter", "./internal/services/web"]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), "");
}

#[test]
fn unreadable_diff_is_a_tool_error() {
    let tmp = provider();
    let output = lint(tmp.path(), &["--diff", "missing.patch", "./internal/services/web"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("failed to load changes"));
}

#[test]
fn list_prints_every_check() {
    let tmp = provider();
    let output = lint(tmp.path(), &["--list"]);

    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    for code in ["AZBP001", "AZBP005", "AZSD002", "AZRN001", "AZRE001", "AZNR003"] {
        assert!(text.contains(code), "{code} missing from --list");
    }
    assert!(!text.contains("schema-local"));
}

#[test]
fn flag_errors_exit_three() {
    let tmp = provider();
    assert_eq!(lint(tmp.path(), &["--bogus"]).status.code(), Some(3));
    assert_eq!(lint(tmp.path(), &["--help"]).status.code(), Some(0));
}
