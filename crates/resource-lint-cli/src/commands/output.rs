//! Output formatting for lint results.

use std::io::Write;

use anyhow::Result;
use resource_lint_core::LintResult;

use crate::OutputFormat;

/// Prints `result` to stdout in `format`.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => write_text(&mut out, result)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(result)?)?,
    }
    Ok(())
}

fn write_text(out: &mut impl Write, result: &LintResult) -> std::io::Result<()> {
    for violation in &result.violations {
        writeln!(out, "{violation}")?;
    }
    if !result.violations.is_empty() {
        writeln!(out, "{} issue(s) found", result.violations.len())?;
    }
    Ok(())
}
