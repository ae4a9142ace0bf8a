use std::time::Duration;

use tracing::info;

use crate::changeset::ChangeSet;
use crate::diff::parse_unified_diff;
use crate::error::{ChangeError, DiffError};

use super::ChangeLoader;

const GITHUB_API: &str = "https://api.github.com";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client abstraction for dependency injection.
pub trait HttpClient {
    /// Performs a GET request with extra headers and returns the body.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError::Http`] on transport failure and
    /// [`ChangeError::HttpStatus`] for non-2xx responses.
    fn get(&self, url: &str, headers: &[(&str, String)]) -> Result<String, ChangeError>;
}

/// Production HTTP client using reqwest.
#[derive(Debug, Default)]
pub struct ReqwestClient;

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, headers: &[(&str, String)]) -> Result<String, ChangeError> {
        let http_error = |e: reqwest::Error| ChangeError::Http {
            url: url.to_owned(),
            message: e.to_string(),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("resource-lint/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(http_error)?;

        let mut request = client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChangeError::HttpStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(http_error)
    }
}

/// Fetches the diff of a GitHub pull request.
pub struct GitHubLoader<C: HttpClient = ReqwestClient> {
    repo: String,
    pr: u64,
    token: Option<String>,
    prefix: String,
    api_base: String,
    client: C,
}

impl GitHubLoader<ReqwestClient> {
    /// Creates a loader for pull request `pr` of `owner/name`.
    #[must_use]
    pub fn new(repo: impl Into<String>, pr: u64, prefix: &str) -> Self {
        Self::with_client(repo, pr, prefix, ReqwestClient)
    }
}

impl<C: HttpClient> GitHubLoader<C> {
    /// Creates a loader using a custom HTTP client.
    #[must_use]
    pub fn with_client(repo: impl Into<String>, pr: u64, prefix: &str, client: C) -> Self {
        Self {
            repo: repo.into(),
            pr,
            token: None,
            prefix: prefix.to_owned(),
            api_base: GITHUB_API.to_owned(),
            client,
        }
    }

    /// Sets the bearer token (usually `GITHUB_TOKEN`).
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Overrides the API base URL (GitHub Enterprise).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_owned();
        self
    }

    fn url(&self) -> String {
        format!("{}/repos/{}/pulls/{}", self.api_base, self.repo, self.pr)
    }
}

impl<C: HttpClient> ChangeLoader for GitHubLoader<C> {
    fn describe(&self) -> String {
        format!("pull request {}#{}", self.repo, self.pr)
    }

    fn is_explicit(&self) -> bool {
        true
    }

    fn load(&self) -> Result<ChangeSet, ChangeError> {
        let mut headers = vec![("Accept", DIFF_MEDIA_TYPE.to_owned())];
        if let Some(token) = &self.token {
            headers.push(("Authorization", format!("Bearer {token}")));
        }

        let body = self.client.get(&self.url(), &headers)?;
        let parsed = parse_unified_diff(&body, &self.prefix)?;
        if parsed.blocks == 0 {
            return Err(DiffError::NoFileBlocks.into());
        }
        info!(
            "Loaded {} changed file(s) from {}",
            parsed.changes.file_count(),
            self.describe()
        );
        Ok(parsed.changes)
    }
}

/// Extracts `owner/name` from a github.com remote URL.
///
/// Accepts `https://github.com/owner/name(.git)` and
/// `git@github.com:owner/name(.git)`.
#[must_use]
pub fn parse_github_remote(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://github.com/")
        .or_else(|| url.strip_prefix("http://github.com/"))
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .or_else(|| url.strip_prefix("git@github.com:"))?;
    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, name) = rest.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some(format!("{owner}/{name}"))
}
