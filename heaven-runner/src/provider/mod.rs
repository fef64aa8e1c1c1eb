//! Provider layer
//!
//! A provider turns a deployment request into the ordered sequence of
//! remote operations for one deployment target. Providers are looked up by
//! name in [`registry`], run once via [`Provider::execute`] and finalized
//! with [`Provider::notify`].

mod elastic_beanstalk;
mod guard;
pub mod registry;

use async_trait::async_trait;
use heaven_client::{ArchiveResolver, PlatformClient, StorageClient};
use heaven_core::domain::archive::archive_name;
use heaven_core::domain::deployment::DeploymentRequest;
use heaven_core::domain::status::Status;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::RemoteOperationError;

pub use elastic_beanstalk::ElasticBeanstalk;
pub use guard::RemoteCall;

/// Contract every deployment target implements
#[async_trait]
pub trait Provider: Send + Sync {
    /// Registry key, e.g. `elastic_beanstalk`
    fn name(&self) -> &'static str;

    /// Prefix for status log lines, e.g. `Beanstalk`
    fn display_name(&self) -> &'static str;

    /// The request this run deploys
    fn request(&self) -> &DeploymentRequest;

    /// Archive file name for the request's commit
    fn archive_name(&self) -> String {
        archive_name(&self.request().commit_sha)
    }

    /// Runs the deployment workflow
    ///
    /// Every step has real-world side effects. Any failure aborts the rest
    /// of the workflow and names the phase that failed; retrying is the
    /// caller's job and means calling `execute` on a fresh provider.
    async fn execute(&mut self) -> Result<(), RemoteOperationError>;

    /// Marks the run successful and composes the user-facing output
    ///
    /// Only called after `execute` succeeded. Calling it twice is harmless.
    fn notify(&mut self);

    fn status(&self) -> &Status;

    fn status_mut(&mut self) -> &mut Status;
}

/// Capability clients a provider drives
///
/// Clients hold configuration only, so one set can be shared by
/// concurrent runs.
#[derive(Clone)]
pub struct Capabilities {
    pub archive: Arc<dyn ArchiveResolver>,
    pub storage: Arc<dyn StorageClient>,
    pub platform: Arc<dyn PlatformClient>,
}

/// Per-run settings handed to a provider at construction
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base directory; each run works in `{workspace_base}/{identifier}`
    pub workspace_base: PathBuf,
    /// Perform a no-op confirmation instead of any remote operation
    pub dry_run: bool,
    /// Upper bound for each remote call
    pub call_timeout: Duration,
    /// Checked at every remote-call boundary
    pub cancel: CancellationToken,
}

impl ProviderSettings {
    pub fn new(workspace_base: impl Into<PathBuf>) -> Self {
        Self {
            workspace_base: workspace_base.into(),
            dry_run: false,
            call_timeout: Duration::from_secs(300),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
