//! `--list` implementation.

use resource_lint_core::title;
use resource_lint_rules::all_checks;

/// Prints every check with its one-line title.
pub fn run() {
    println!("Available checks:\n");
    for check in all_checks() {
        println!("{:<10} {}", check.name(), title(check.as_ref()));
    }

    println!("\nUse --checks to run a subset, e.g.:");
    println!("  resource-lint --checks AZBP001,AZRE001 ./internal/services/web/...");
}
