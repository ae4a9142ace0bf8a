//! Change set sources and the priority order between them.

mod diff_file;
mod git;
mod github;

use std::path::PathBuf;

use tracing::debug;

use crate::changeset::{ChangeSet, SERVICE_PATH_PREFIX};
use crate::error::ChangeError;

pub use diff_file::DiffFileLoader;
pub use git::{LocalGitLoader, WorktreeLoader};
pub use github::{parse_github_remote, GitHubLoader, HttpClient, ReqwestClient};

/// A source of a [`ChangeSet`].
pub trait ChangeLoader {
    /// Short description used in log output.
    fn describe(&self) -> String;

    /// Whether the user asked for this source explicitly. Failures of
    /// explicit sources abort the run; others fall back to unfiltered
    /// analysis.
    fn is_explicit(&self) -> bool;

    /// Produces the change set.
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot be read or parsed.
    fn load(&self) -> Result<ChangeSet, ChangeError>;
}

/// Inputs for [`select_loader`], usually taken from command line flags.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Disable change filtering entirely.
    pub no_filter: bool,
    /// Unified diff file to read instead of asking git.
    pub diff_file: Option<PathBuf>,
    /// Pull request number to fetch from GitHub.
    pub pr: Option<u64>,
    /// `owner/name` of the GitHub repository.
    pub github_repo: Option<String>,
    /// Token sent as bearer authorization to the GitHub API.
    pub github_token: Option<String>,
    /// Git remote to compare against.
    pub remote: Option<String>,
    /// Base branch on the remote.
    pub base: Option<String>,
    /// Base branch used when neither a flag nor upstream config names one.
    pub default_base: String,
    /// Service path prefix for normalization.
    pub prefix: String,
    /// Directory from which the git repository is discovered.
    pub work_dir: PathBuf,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            no_filter: false,
            diff_file: None,
            pr: None,
            github_repo: None,
            github_token: None,
            remote: None,
            base: None,
            default_base: "main".to_owned(),
            prefix: SERVICE_PATH_PREFIX.to_owned(),
            work_dir: PathBuf::from("."),
        }
    }
}

/// Picks the change loader for `options`.
///
/// Priority: `no_filter`, then a diff file, then a GitHub pull request,
/// then the local repository (worktree-aware). Returns `None` when
/// filtering is disabled or no repository is found.
///
/// # Errors
///
/// Returns [`ChangeError::MissingGitHubRepo`] when a pull request is
/// requested and the repository cannot be determined.
pub fn select_loader(options: &LoaderOptions) -> Result<Option<Box<dyn ChangeLoader>>, ChangeError> {
    if options.no_filter {
        debug!("Change filtering disabled");
        return Ok(None);
    }

    if let Some(path) = &options.diff_file {
        return Ok(Some(Box::new(DiffFileLoader::new(path, &options.prefix))));
    }

    if let Some(pr) = options.pr {
        let repo = match &options.github_repo {
            Some(repo) => repo.clone(),
            None => origin_github_repo(options).ok_or(ChangeError::MissingGitHubRepo)?,
        };
        let mut loader = GitHubLoader::new(repo, pr, &options.prefix);
        if let Some(token) = &options.github_token {
            loader = loader.with_token(token.clone());
        }
        return Ok(Some(Box::new(loader)));
    }

    let Ok(repo) = git2::Repository::discover(&options.work_dir) else {
        debug!(
            "No git repository at {}, change filtering disabled",
            options.work_dir.display()
        );
        return Ok(None);
    };

    let local = LocalGitLoader::new(&options.work_dir, &options.prefix)
        .with_remote(options.remote.clone())
        .with_base(options.base.clone())
        .with_default_base(&options.default_base);

    if repo.is_worktree() {
        Ok(Some(Box::new(WorktreeLoader::new(local))))
    } else {
        Ok(Some(Box::new(local)))
    }
}

fn origin_github_repo(options: &LoaderOptions) -> Option<String> {
    let repo = git2::Repository::discover(&options.work_dir).ok()?;
    let remote = repo.find_remote("origin").ok()?;
    parse_github_remote(remote.url()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filter_wins_over_everything() -> anyhow::Result<()> {
        let options = LoaderOptions {
            no_filter: true,
            diff_file: Some(PathBuf::from("changes.diff")),
            pr: Some(12),
            ..LoaderOptions::default()
        };
        assert!(select_loader(&options)?.is_none());
        Ok(())
    }

    #[test]
    fn diff_file_wins_over_pull_request() -> anyhow::Result<()> {
        let options = LoaderOptions {
            diff_file: Some(PathBuf::from("changes.diff")),
            pr: Some(12),
            github_repo: Some("hashicorp/terraform-provider-azurerm".to_owned()),
            ..LoaderOptions::default()
        };
        let loader = select_loader(&options)?.expect("loader");
        assert!(loader.describe().starts_with("diff file"));
        assert!(loader.is_explicit());
        Ok(())
    }

    #[test]
    fn pull_request_without_repository_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = LoaderOptions {
            pr: Some(7),
            work_dir: dir.path().to_path_buf(),
            ..LoaderOptions::default()
        };
        assert!(matches!(
            select_loader(&options),
            Err(ChangeError::MissingGitHubRepo)
        ));
    }

    #[test]
    fn outside_a_repository_filtering_is_disabled() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let options = LoaderOptions {
            work_dir: dir.path().to_path_buf(),
            ..LoaderOptions::default()
        };
        assert!(select_loader(&options)?.is_none());
        Ok(())
    }
}
