//! # resource-lint-changes
//!
//! Change tracking for resource-lint: turns a git diff into a [`ChangeSet`]
//! so that only newly added or modified lines are reported.
//!
//! A change set comes from exactly one loader:
//!
//! - [`DiffFileLoader`] reads a unified diff from disk (`--diff`)
//! - [`GitHubLoader`] fetches a pull request diff (`--pr`)
//! - [`LocalGitLoader`] compares the working tree with the merge base of
//!   `HEAD` and the resolved remote branch
//! - [`WorktreeLoader`] does the same from a linked git worktree
//!
//! [`select_loader`] applies the priority order between them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod changeset;
mod diff;
mod error;
pub mod loader;

pub use changeset::{is_new_file, should_report, ChangeSet, SERVICE_PATH_PREFIX};
pub use diff::{parse_unified_diff, ParsedDiff};
pub use error::{ChangeError, DiffError};
pub use loader::{
    select_loader, ChangeLoader, DiffFileLoader, GitHubLoader, HttpClient, LoaderOptions,
    LocalGitLoader, ReqwestClient, WorktreeLoader,
};
