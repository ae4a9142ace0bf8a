//! Check that every file starts with the license header.
//!
//! # Rationale
//!
//! The provider is MPL-2.0 licensed and every source file carries the same
//! two-line header, checked verbatim.
//!
//! # Detected Patterns
//!
//! - A file without comments
//! - A first comment group that does not start on line 1
//! - A first comment group whose text differs from [`LICENSE_HEADER`]
//!
//! A comment directly below the header, without a blank line, joins its
//! group and is reported as a mismatch. A trailing comment on the package
//! line does not.

use resource_lint_core::{AnalysisError, Analyzer, Fact, Pass, Suggestion};
use resource_lint_go::{Comment, GoFile, Position};

/// Check code.
pub const CODE: &str = "AZBP005";

/// The expected header, without trailing newline.
pub const LICENSE_HEADER: &str =
    "// Copyright (c) HashiCorp, Inc.\n// SPDX-License-Identifier: MPL-2.0";

/// Flags missing, misplaced or altered license headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LicenseHeader;

impl LicenseHeader {
    /// Creates the check.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Problem {
    Missing,
    Misplaced,
    Mismatch,
}

/// Comments of the first group: comments separated only by whitespace
/// with at most one line break, as Go groups them.
fn first_group(file: &GoFile) -> &[Comment] {
    let comments = file.comments();
    let source = file.source();
    let len = comments
        .windows(2)
        .take_while(|pair| {
            let gap = &source[pair[0].end..pair[1].start];
            gap.trim().is_empty() && gap.matches('\n').count() <= 1
        })
        .count();
    &comments[..comments.len().min(len + 1)]
}

fn problem(file: &GoFile) -> Option<Problem> {
    let group = first_group(file);
    let Some(first) = group.first() else {
        return Some(Problem::Missing);
    };
    if first.line != 1 {
        return Some(Problem::Misplaced);
    }
    let text = group
        .iter()
        .map(|c| c.text.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    (text != LICENSE_HEADER).then_some(Problem::Mismatch)
}

impl Analyzer for LicenseHeader {
    fn name(&self) -> &'static str {
        CODE
    }

    fn doc(&self) -> &'static str {
        "check for the license header at the top of each file\n\n\
         The first comment group of every file must start on line 1 and read \
         exactly `// Copyright (c) HashiCorp, Inc.` / `// SPDX-License-Identifier: MPL-2.0`."
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<Option<Fact>, AnalysisError> {
        for file in pass.package().files() {
            let message = match problem(file) {
                None => continue,
                Some(Problem::Missing) => "file has no license header",
                Some(Problem::Misplaced) => "license header must start on line 1",
                Some(Problem::Mismatch) => "license header does not match the expected text",
            };
            pass.report_at(
                file,
                Position { line: 1, column: 1 },
                message,
                Some(Suggestion::with_replacement(
                    "start the file with the license header",
                    LICENSE_HEADER,
                )),
            );
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::check_file;

    fn check_code(code: &str) -> Vec<resource_lint_core::Violation> {
        check_file(CODE, code)
    }

    #[test]
    fn test_accepts_exact_header() {
        let violations = check_code(
            "// Copyright (c) HashiCorp, Inc.\n// SPDX-License-Identifier: MPL-2.0\n\n// Package web manages web apps.\npackage web\n",
        );
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_detects_missing_header() {
        let violations = check_code("package web\n\nfunc f() {}\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "file has no license header");
        assert_eq!(violations[0].location.line, 1);
        let suggestion = violations[0].suggestion.as_ref().expect("suggestion");
        assert_eq!(suggestion.replacement.as_deref(), Some(LICENSE_HEADER));
    }

    #[test]
    fn test_detects_misplaced_header() {
        let violations = check_code(
            "\n// Copyright (c) HashiCorp, Inc.\n// SPDX-License-Identifier: MPL-2.0\n\npackage web\n",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "license header must start on line 1");
    }

    #[test]
    fn test_detects_altered_or_extended_header() {
        let altered = check_code(
            "// Copyright (c) Microsoft Corporation.\n// SPDX-License-Identifier: MPL-2.0\n\npackage web\n",
        );
        assert_eq!(altered.len(), 1);

        let extended = check_code(
            "// Copyright (c) HashiCorp, Inc.\n// SPDX-License-Identifier: MPL-2.0\n// Package web manages web apps.\npackage web\n",
        );
        assert_eq!(extended.len(), 1);
        assert_eq!(
            extended[0].message,
            "license header does not match the expected text"
        );
    }

    #[test]
    fn test_groups_split_on_blank_lines() {
        let file = GoFile::parse(
            "/w/a.go",
            "a.go",
            "// a\n// b\n\n// c\npackage web\n".to_owned(),
        )
        .expect("parse");
        assert_eq!(first_group(&file).len(), 2);
    }

    #[test]
    fn test_trailing_comment_on_code_line_is_not_grouped() {
        let source = "// Copyright (c) HashiCorp, Inc.\n// SPDX-License-Identifier: MPL-2.0\npackage web // web apps\n";
        let file = GoFile::parse("/w/a.go", "a.go", source.to_owned()).expect("parse");
        assert_eq!(first_group(&file).len(), 2);
        assert!(check_code(source).is_empty());
    }
}
