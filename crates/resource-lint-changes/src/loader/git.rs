//! Change sets from the local repository.
//!
//! The working tree (staged, unstaged and untracked files) is compared with
//! the merge base of `HEAD` and `refs/remotes/<remote>/<base>`. The remote
//! and base come from flags, then the current branch's upstream config,
//! then auto-detection (`origin`, then `upstream`; base `main`).

use std::path::{Path, PathBuf};

use git2::{DiffFormat, DiffOptions, Repository};
use tracing::{debug, info};

use crate::changeset::ChangeSet;
use crate::diff::parse_unified_diff;
use crate::error::ChangeError;

use super::ChangeLoader;

const AUTO_REMOTES: [&str; 2] = ["origin", "upstream"];

/// Compares the working tree of a regular checkout with its base branch.
#[derive(Debug, Clone)]
pub struct LocalGitLoader {
    work_dir: PathBuf,
    prefix: String,
    remote: Option<String>,
    base: Option<String>,
    default_base: String,
}

impl LocalGitLoader {
    /// Creates a loader discovering the repository from `work_dir`.
    #[must_use]
    pub fn new(work_dir: impl AsRef<Path>, prefix: &str) -> Self {
        Self {
            work_dir: work_dir.as_ref().to_path_buf(),
            prefix: prefix.to_owned(),
            remote: None,
            base: None,
            default_base: "main".to_owned(),
        }
    }

    /// Remote name overriding upstream config and auto-detection.
    #[must_use]
    pub fn with_remote(mut self, remote: Option<String>) -> Self {
        self.remote = remote;
        self
    }

    /// Base branch overriding upstream config.
    #[must_use]
    pub fn with_base(mut self, base: Option<String>) -> Self {
        self.base = base;
        self
    }

    /// Base branch used when nothing else names one.
    #[must_use]
    pub fn with_default_base(mut self, base: &str) -> Self {
        self.default_base = base.to_owned();
        self
    }

    fn open(&self) -> Result<Repository, ChangeError> {
        Repository::discover(&self.work_dir).map_err(|_| ChangeError::NotARepository {
            path: self.work_dir.clone(),
        })
    }

    /// Diffs `repo`'s working tree, reading remote and branch config from
    /// `config_repo`.
    fn load_from(&self, repo: &Repository, config_repo: &Repository) -> Result<ChangeSet, ChangeError> {
        let (remote, base) = self.resolve_target(repo, config_repo)?;
        let refspec = format!("refs/remotes/{remote}/{base}");
        debug!("Comparing working tree against merge base with {}", refspec);

        let target = repo
            .revparse_single(&refspec)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|_| ChangeError::RefNotFound {
                refspec: refspec.clone(),
            })?;
        let head = repo.head()?.peel_to_commit()?;
        let merge_base = repo.merge_base(head.id(), target.id())?;
        let base_tree = repo.find_commit(merge_base)?.tree()?;

        let mut opts = DiffOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .show_untracked_content(true);
        let diff = repo.diff_tree_to_workdir_with_index(Some(&base_tree), Some(&mut opts))?;

        let patch = patch_text(&diff)?;
        let parsed = parse_unified_diff(&patch, &self.prefix)?;
        info!(
            "Loaded {} changed file(s) relative to {}/{}",
            parsed.changes.file_count(),
            remote,
            base
        );
        Ok(parsed.changes)
    }

    fn resolve_target(
        &self,
        repo: &Repository,
        config_repo: &Repository,
    ) -> Result<(String, String), ChangeError> {
        let upstream = current_branch(repo).and_then(|branch| upstream_of(config_repo, &branch));
        let (upstream_remote, upstream_base) = match upstream {
            Some((remote, base)) => (Some(remote), Some(base)),
            None => (None, None),
        };

        let remote = match self.remote.clone().or(upstream_remote) {
            Some(remote) => remote,
            None => AUTO_REMOTES
                .iter()
                .find(|name| config_repo.find_remote(name).is_ok())
                .map(|name| (*name).to_owned())
                .ok_or(ChangeError::NoRemote)?,
        };
        let base = self
            .base
            .clone()
            .or(upstream_base)
            .unwrap_or_else(|| self.default_base.clone());

        Ok((remote, base))
    }
}

impl ChangeLoader for LocalGitLoader {
    fn describe(&self) -> String {
        format!("git repository at {}", self.work_dir.display())
    }

    fn is_explicit(&self) -> bool {
        self.remote.is_some() || self.base.is_some()
    }

    fn load(&self) -> Result<ChangeSet, ChangeError> {
        let repo = self.open()?;
        self.load_from(&repo, &repo)
    }
}

/// Same as [`LocalGitLoader`] from inside a linked worktree. Remote and
/// branch config is read from the main repository.
#[derive(Debug, Clone)]
pub struct WorktreeLoader {
    inner: LocalGitLoader,
}

impl WorktreeLoader {
    /// Wraps a configured local loader.
    #[must_use]
    pub fn new(inner: LocalGitLoader) -> Self {
        Self { inner }
    }
}

impl ChangeLoader for WorktreeLoader {
    fn describe(&self) -> String {
        format!("git worktree at {}", self.inner.work_dir.display())
    }

    fn is_explicit(&self) -> bool {
        self.inner.is_explicit()
    }

    fn load(&self) -> Result<ChangeSet, ChangeError> {
        let repo = self.inner.open()?;
        if !repo.is_worktree() {
            return self.inner.load_from(&repo, &repo);
        }
        let main = Repository::open(repo.commondir())?;
        debug!("Worktree main repository: {}", main.path().display());
        self.inner.load_from(&repo, &main)
    }
}

fn current_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if !head.is_branch() {
        return None;
    }
    head.shorthand().map(str::to_owned)
}

/// Remote and base branch from `branch.<name>.remote` / `.merge`.
fn upstream_of(repo: &Repository, branch: &str) -> Option<(String, String)> {
    let config = repo.config().ok()?;
    let remote = config.get_string(&format!("branch.{branch}.remote")).ok()?;
    let merge = config.get_string(&format!("branch.{branch}.merge")).ok()?;
    if remote == "." {
        return None;
    }
    let base = merge.strip_prefix("refs/heads/").unwrap_or(&merge).to_owned();
    Some((remote, base))
}

fn patch_text(diff: &git2::Diff<'_>) -> Result<String, git2::Error> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        match origin {
            '+' | '-' | ' ' => text.push(origin),
            'F' | 'H' => {}
            // end-of-file newline markers carry no target lines
            _ => return true,
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        if !text.ends_with('\n') {
            text.push('\n');
        }
        true
    })?;
    Ok(text)
}
