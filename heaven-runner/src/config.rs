//! Runner configuration
//!
//! Defines the configurable parameters for a deployment run: workspace
//! location, remote-call timeout, dry-run mode and the credentials for the
//! remote systems. Credentials are read once here and passed explicitly to
//! the clients; nothing downstream touches the process environment.

use heaven_client::AwsCredentials;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::provider::ProviderSettings;

const DEFAULT_WORKSPACE: &str = "/tmp/heaven";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 300;

/// Runner configuration
#[derive(Clone)]
pub struct Config {
    /// Base directory for per-deployment working directories
    pub workspace_base: PathBuf,

    /// Skip every remote operation and only confirm the wiring
    pub dry_run: bool,

    /// Maximum time a single remote call may take
    pub call_timeout: Duration,

    /// Deployment account credentials (required unless dry run)
    pub aws_credentials: Option<AwsCredentials>,

    /// GitHub API base URL (e.g., "https://api.github.com")
    pub github_api_url: String,

    /// Token for private repositories
    pub github_token: Option<String>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(workspace_base: PathBuf) -> Self {
        Self {
            workspace_base,
            dry_run: false,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            aws_credentials: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - HEAVEN_WORKSPACE (optional, default: /tmp/heaven)
    /// - HEAVEN_DRY_RUN (optional, "1"/"true" enables dry run)
    /// - HEAVEN_CALL_TIMEOUT (optional, seconds, default: 300)
    /// - BEANSTALK_ACCESS_KEY_ID / BEANSTALK_SECRET_ACCESS_KEY (required unless dry run)
    /// - GITHUB_API_URL (optional, default: https://api.github.com)
    /// - GITHUB_TOKEN (optional)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let workspace_base = lookup("HEAVEN_WORKSPACE")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE));

        let dry_run = lookup("HEAVEN_DRY_RUN")
            .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let call_timeout = match lookup("HEAVEN_CALL_TIMEOUT") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| anyhow::anyhow!("HEAVEN_CALL_TIMEOUT must be a number of seconds"))?,
            None => Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        };

        let aws_credentials = match (
            lookup("BEANSTALK_ACCESS_KEY_ID"),
            lookup("BEANSTALK_SECRET_ACCESS_KEY"),
        ) {
            (Some(id), Some(secret)) => Some(AwsCredentials::new(id, secret)),
            (None, None) => None,
            _ => anyhow::bail!(
                "BEANSTALK_ACCESS_KEY_ID and BEANSTALK_SECRET_ACCESS_KEY must be set together"
            ),
        };

        let github_api_url = lookup("GITHUB_API_URL")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        let github_token = lookup("GITHUB_TOKEN").filter(|s| !s.is_empty());

        Ok(Self {
            workspace_base,
            dry_run,
            call_timeout,
            aws_credentials,
            github_api_url,
            github_token,
        })
    }

    /// Enables or disables dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workspace_base.as_os_str().is_empty() {
            anyhow::bail!("workspace_base cannot be empty");
        }

        if self.call_timeout.is_zero() {
            anyhow::bail!("call_timeout must be greater than 0");
        }

        if !self.github_api_url.starts_with("http://") && !self.github_api_url.starts_with("https://")
        {
            anyhow::bail!("github_api_url must start with http:// or https://");
        }

        if !self.dry_run && self.aws_credentials.is_none() {
            anyhow::bail!(
                "BEANSTALK_ACCESS_KEY_ID and BEANSTALK_SECRET_ACCESS_KEY are required outside dry run"
            );
        }

        Ok(())
    }

    /// Per-run provider settings derived from this configuration
    pub fn provider_settings(&self, cancel: CancellationToken) -> ProviderSettings {
        ProviderSettings {
            workspace_base: self.workspace_base.clone(),
            dry_run: self.dry_run,
            call_timeout: self.call_timeout,
            cancel,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_WORKSPACE))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("workspace_base", &self.workspace_base)
            .field("dry_run", &self.dry_run)
            .field("call_timeout", &self.call_timeout)
            .field("aws_credentials", &self.aws_credentials)
            .field("github_api_url", &self.github_api_url)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
