//! resource-lint CLI tool.
//!
//! Usage:
//! ```bash
//! resource-lint [OPTIONS] [PATTERNS]...
//! resource-lint --list
//! resource-lint --no-filter ./internal/services/web/...
//! resource-lint --diff changes.patch
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit code when no issues were found.
const EXIT_CLEAN: u8 = 0;
/// Exit code when at least one finding reaches warning severity.
const EXIT_ISSUES: u8 = 1;
/// Exit code for tool and environment failures.
const EXIT_ERROR: u8 = 2;
/// Exit code for invalid command line flags.
const EXIT_USAGE: u8 = 3;

/// Convention linter for terraform-provider-azurerm resources
#[derive(Parser)]
#[command(name = "resource-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Package patterns (`./...`, `./internal/services/web`). Derived from
    /// the changed files when omitted.
    patterns: Vec<String>,

    /// List the available checks and exit
    #[arg(long)]
    list: bool,

    /// Disable change tracking and report every finding
    #[arg(long)]
    no_filter: bool,

    /// Git remote to compare against
    #[arg(long, value_name = "NAME")]
    remote: Option<String>,

    /// Base branch to compare against
    #[arg(long, value_name = "BRANCH")]
    base: Option<String>,

    /// Read changes from a unified diff file
    #[arg(long = "diff", value_name = "FILE")]
    diff_file: Option<PathBuf>,

    /// Read changes from a GitHub pull request
    #[arg(long, value_name = "NUMBER")]
    pr: Option<u64>,

    /// GitHub repository of the pull request (`owner/name`)
    #[arg(long, value_name = "OWNER/NAME")]
    github_repo: Option<String>,

    /// Token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Only run specific checks (comma-separated)
    #[arg(long, value_name = "CODES")]
    checks: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per finding plus a count.
    #[default]
    Text,
    /// The full result as JSON.
    Json,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_CLEAN };
            // Nothing useful to do if the terminal is gone.
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.list {
        commands::list::run();
        return ExitCode::from(EXIT_CLEAN);
    }

    match commands::run::run(&cli.options()) {
        Ok(result) => {
            if let Err(e) = commands::output::print(&result, cli.format) {
                eprintln!("Error: {e:#}");
                return ExitCode::from(EXIT_ERROR);
            }
            if result.has_violations_at(resource_lint_core::Severity::Warning) {
                ExitCode::from(EXIT_ISSUES)
            } else {
                ExitCode::from(EXIT_CLEAN)
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

impl Cli {
    fn options(&self) -> commands::run::RunOptions {
        commands::run::RunOptions {
            patterns: self.patterns.clone(),
            no_filter: self.no_filter,
            remote: self.remote.clone(),
            base: self.base.clone(),
            diff_file: self.diff_file.clone(),
            pr: self.pr,
            github_repo: self.github_repo.clone(),
            github_token: self.github_token.clone(),
            checks: self
                .checks
                .as_deref()
                .map(|c| {
                    c.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            config: self.config.clone(),
        }
    }
}
