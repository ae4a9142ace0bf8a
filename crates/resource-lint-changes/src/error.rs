use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing unified diff text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    /// Non-empty input without any `diff --git` block.
    #[error("diff contains no file blocks")]
    NoFileBlocks,
}

/// Errors produced by change loaders.
#[derive(Debug, Error)]
pub enum ChangeError {
    /// A libgit2 call failed.
    #[error("git operation failed")]
    Git(#[from] git2::Error),

    /// No repository contains the working directory.
    #[error("not a git repository: '{path}'")]
    NotARepository {
        /// Directory the search started from.
        path: PathBuf,
    },

    /// Neither `origin` nor `upstream` exists and none was given.
    #[error("no git remote found (tried 'origin' and 'upstream')")]
    NoRemote,

    /// The remote-tracking ref of the base branch is missing.
    #[error("failed to resolve reference '{refspec}'")]
    RefNotFound {
        /// The ref that was looked up (e.g. `refs/remotes/origin/main`).
        refspec: String,
    },

    /// The `--diff` file could not be read.
    #[error("failed to read diff file '{path}'")]
    DiffFile {
        /// Path given on the command line.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The diff text is not a usable unified diff.
    #[error("invalid diff: {0}")]
    Diff(#[from] DiffError),

    /// `--pr` was given without a repository to ask.
    #[error("--pr requires --github-repo <owner/name> or an 'origin' remote on github.com")]
    MissingGitHubRepo,

    /// The GitHub request did not complete.
    #[error("request to {url} failed: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// Transport error text.
        message: String,
    },

    /// GitHub answered with a non-2xx status.
    #[error("request to {url} returned HTTP {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },
}
