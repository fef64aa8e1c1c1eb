//! Deployment entry point
//!
//! Wires a request to its provider, runs it and reports the outcome. This is
//! the seam the outer CLI or queue worker calls.

use anyhow::{Context, Result};
use heaven_client::{AwsClients, AwsCredentials, GithubArchiveResolver};
use heaven_core::domain::deployment::DeploymentRequest;
use heaven_core::domain::status::Status;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{ProviderError, RemoteOperationError};
use crate::provider::{Capabilities, ProviderSettings, registry};

/// Result of one provider run
#[derive(Debug)]
pub struct DeploymentOutcome {
    /// Registry name of the provider that ran
    pub provider: &'static str,
    /// Final status; the log is complete up to the failing phase
    pub status: Status,
    /// Why the run stopped, if it did not succeed
    pub error: Option<RemoteOperationError>,
}

impl DeploymentOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.status.success() == Some(true)
    }
}

/// Runs `request` with the provider registered as `provider_name`
///
/// On success the provider is notified and the status carries its output.
/// On failure the status is marked failed (never successful) and the
/// error is returned alongside it; retrying is up to the caller.
pub async fn run_deployment(
    provider_name: &str,
    request: DeploymentRequest,
    capabilities: Capabilities,
    settings: ProviderSettings,
) -> Result<DeploymentOutcome, ProviderError> {
    let identifier = request.identifier.clone();
    let mut provider = registry::build(provider_name, request, capabilities, settings)?;

    info!(
        deployment = %identifier,
        provider = provider.name(),
        sha = %provider.request().commit_sha,
        environment = %provider.request().environment,
        "starting deployment"
    );

    let error = match provider.execute().await {
        Ok(()) => {
            provider.notify();
            info!(deployment = %identifier, output = %provider.status().output(), "deployment succeeded");
            None
        }
        Err(e) => {
            error!(deployment = %identifier, phase = %e.phase, cause = %e.cause, "deployment failed");
            provider.status_mut().fail();
            Some(e)
        }
    };

    Ok(DeploymentOutcome {
        provider: provider.name(),
        status: provider.status().clone(),
        error,
    })
}

/// Builds the production capability clients for `region`
///
/// In dry run no remote call is ever made, so placeholder credentials are
/// used when none are configured.
pub async fn connect_capabilities(config: &Config, region: &str) -> Result<Capabilities> {
    let credentials = match (&config.aws_credentials, config.dry_run) {
        (Some(credentials), _) => credentials.clone(),
        (None, true) => AwsCredentials::new("dry-run", "dry-run"),
        (None, false) => anyhow::bail!("AWS credentials are not configured"),
    };

    let aws = AwsClients::connect(region, &credentials).await;
    let archive = GithubArchiveResolver::new(&config.github_api_url, config.github_token.clone())
        .context("Failed to build GitHub client")?;

    Ok(Capabilities {
        archive: Arc::new(archive),
        storage: Arc::new(aws.storage()),
        platform: Arc::new(aws.platform()),
    })
}
