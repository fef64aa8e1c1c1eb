//! Source archive resolution
//!
//! Turns a commit reference into a downloadable archive link and fetches it
//! to local disk.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{Client, StatusCode, redirect};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{ClientError, Result};

const USER_AGENT: &str = concat!("heaven/", env!("CARGO_PKG_VERSION"));

/// Packaging token source control uses in tarball links
const LEGACY_TARBALL: &str = "legacy.tar.gz";

/// Packaging token the platform expects
const LEGACY_ZIP: &str = "legacy.zip";

/// Capability for turning a commit into a local archive
#[async_trait]
pub trait ArchiveResolver: Send + Sync {
    /// Looks up the archive link for a commit
    ///
    /// # Arguments
    /// * `commit_sha` - Commit to archive
    /// * `repository` - Repository in `owner/name` form
    ///
    /// # Errors
    /// `ClientError::SourceNotFound` when source control has no archive for
    /// the commit.
    async fn resolve(&self, commit_sha: &str, repository: &str) -> Result<String>;

    /// Rewrites an archive link to the packaging format the platform accepts
    fn normalize(&self, archive_url: &str) -> String {
        normalize_archive_url(archive_url)
    }

    /// Downloads an archive to `destination`, replacing any existing file
    async fn fetch(&self, archive_url: &str, destination: &Path) -> Result<()>;
}

/// Replaces the last `legacy.tar.gz` token of a link with `legacy.zip`
///
/// Everything else in the link is left untouched, and a link without the
/// token comes back unchanged.
pub fn normalize_archive_url(archive_url: &str) -> String {
    match archive_url.rfind(LEGACY_TARBALL) {
        Some(idx) => {
            let mut normalized = String::with_capacity(archive_url.len());
            normalized.push_str(&archive_url[..idx]);
            normalized.push_str(LEGACY_ZIP);
            normalized.push_str(&archive_url[idx + LEGACY_TARBALL.len()..]);
            normalized
        }
        None => archive_url.to_string(),
    }
}

/// GitHub-backed archive resolver
///
/// Archive links are obtained from the tarball endpoint without following
/// its redirect; the `Location` header is the link.
#[derive(Debug, Clone)]
pub struct GithubArchiveResolver {
    /// Base URL of the GitHub API (e.g., "https://api.github.com")
    api_url: String,
    token: Option<String>,
    /// Client for API calls; never follows redirects
    api: Client,
    /// Client for archive downloads
    download: Client,
}

impl GithubArchiveResolver {
    /// Create a new resolver
    ///
    /// # Arguments
    /// * `api_url` - Base URL of the GitHub API
    /// * `token` - Optional token for private repositories
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let api = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()?;
        let download = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            api,
            download,
        })
    }

    /// Get the base URL of the API
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl ArchiveResolver for GithubArchiveResolver {
    async fn resolve(&self, commit_sha: &str, repository: &str) -> Result<String> {
        let url = format!("{}/repos/{}/tarball/{}", self.api_url, repository, commit_sha);
        debug!(%url, "requesting archive link");

        let mut request = self
            .api
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::SourceNotFound {
                repository: repository.to_string(),
                commit_sha: commit_sha.to_string(),
            });
        }

        if !status.is_redirection() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let link = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ClientError::api_error(status.as_u16(), "archive redirect without a Location header")
            })?;

        info!(repository, commit_sha, "resolved archive link");
        Ok(link.to_string())
    }

    async fn fetch(&self, archive_url: &str, destination: &Path) -> Result<()> {
        let fetch_error = |message: String| ClientError::Fetch {
            url: archive_url.to_string(),
            message,
        };

        let mut response = self
            .download
            .get(archive_url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("unexpected status {}", status)));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(destination).await?;

        let mut written = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| fetch_error(e.to_string()))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        info!(path = %destination.display(), size = written, "archive downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_replaces_tarball_token() {
        assert_eq!(
            normalize_archive_url("https://codeload.github.com/acme/shop/legacy.tar.gz/abc123"),
            "https://codeload.github.com/acme/shop/legacy.zip/abc123"
        );
        assert_eq!(
            normalize_archive_url("https://example.com/archive/legacy.tar.gz"),
            "https://example.com/archive/legacy.zip"
        );
    }

    #[test]
    fn test_normalize_only_touches_last_token() {
        assert_eq!(
            normalize_archive_url("https://example.com/legacy.tar.gz/x/legacy.tar.gz?token=1"),
            "https://example.com/legacy.tar.gz/x/legacy.zip?token=1"
        );
    }

    #[test]
    fn test_normalize_without_token_is_noop() {
        let url = "https://codeload.github.com/acme/shop/zip/abc123?token=xyz";
        assert_eq!(normalize_archive_url(url), url);
        assert_eq!(normalize_archive_url(""), "");
    }

    #[test]
    fn test_resolver_trims_trailing_slash() {
        let resolver = GithubArchiveResolver::new("https://api.github.com/", None).unwrap();
        assert_eq!(resolver.api_url(), "https://api.github.com");
    }
}
