//! Elastic Beanstalk provider
//!
//! Deploys a commit by uploading its archive to the application's S3 bucket,
//! registering it as a new application version and pointing the
//! `{app}-{environment}` environment at that version.

use async_trait::async_trait;
use chrono::Utc;
use heaven_core::domain::archive::Archive;
use heaven_core::domain::deployment::DeploymentRequest;
use heaven_core::domain::status::Status;
use heaven_core::domain::version::{
    ApplicationVersion, CreateApplicationVersion, EnvironmentDescription, EnvironmentUpdate,
    SourceBundle, version_label,
};
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::{Capabilities, Provider, ProviderSettings, RemoteCall};
use crate::error::{Phase, PhaseFailure, ProviderError, RemoteOperationError};

const CONSOLE_URL: &str = "https://console.aws.amazon.com/elasticbeanstalk/home";

/// Elastic Beanstalk deployment run
pub struct ElasticBeanstalk {
    request: DeploymentRequest,
    app_name: String,
    capabilities: Capabilities,
    settings: ProviderSettings,
    remote: RemoteCall,
    status: Status,

    /// Current application version, looked up at most once per run
    app_version: Option<ApplicationVersion>,

    /// Environment id reported by the final update
    environment_id: Option<String>,
}

impl ElasticBeanstalk {
    pub const NAME: &'static str = "elastic_beanstalk";
    pub const DISPLAY_NAME: &'static str = "Beanstalk";

    /// Creates a provider for one run
    ///
    /// # Errors
    /// `ProviderError::Request` when the request fails validation, and
    /// `ProviderError::InvalidRequest` when the custom configuration has no
    /// `app_name`.
    pub fn new(
        request: DeploymentRequest,
        capabilities: Capabilities,
        settings: ProviderSettings,
    ) -> Result<Self, ProviderError> {
        request.validate()?;
        let app_name = request
            .app_name()
            .ok_or_else(|| ProviderError::InvalidRequest("custom config is missing app_name".into()))?
            .to_string();
        let remote = RemoteCall::new(settings.call_timeout, settings.cancel.clone());

        Ok(Self {
            request,
            app_name,
            capabilities,
            settings,
            remote,
            status: Status::new(),
            app_version: None,
            environment_id: None,
        })
    }

    /// Registry constructor
    pub fn boxed(
        request: DeploymentRequest,
        capabilities: Capabilities,
        settings: ProviderSettings,
    ) -> Result<Box<dyn Provider>, ProviderError> {
        Ok(Box::new(Self::new(request, capabilities, settings)?))
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Environment the run updates: `{app_name}-{environment}`
    pub fn environment_name(&self) -> String {
        format!("{}-{}", self.app_name, self.request.environment)
    }

    /// Object key of the uploaded bundle: `{app_name}/heaven-{sha}.zip`
    pub fn bucket_key(&self) -> String {
        format!("{}/{}", self.app_name, self.archive_name())
    }

    /// Local path the archive is fetched to
    pub fn archive_path(&self) -> PathBuf {
        self.settings
            .workspace_base
            .join(&self.request.identifier)
            .join(self.archive_name())
    }

    /// Console link for an environment
    pub fn dashboard_url(&self, environment_id: &str) -> String {
        format!(
            "{}?region={}#/environment/dashboard?applicationName={}&environmentId={}",
            CONSOLE_URL,
            self.request.aws_region(),
            self.app_name,
            environment_id
        )
    }

    /// Bucket that holds the application's bundles
    ///
    /// A bucket pinned under `aws.bucket` wins. Otherwise the bucket of the
    /// newest existing version is used; the lookup runs once per run.
    pub async fn bucket_name(&mut self) -> Result<String, RemoteOperationError> {
        if let Some(bucket) = self.request.bucket_override() {
            return Ok(bucket.to_string());
        }

        let version = match self.app_version.take() {
            Some(version) => version,
            None => self.lookup_app_version().await?,
        };
        let bucket = version.source_bundle.bucket.clone();
        self.app_version = Some(version);

        Ok(bucket)
    }

    async fn lookup_app_version(&self) -> Result<ApplicationVersion, RemoteOperationError> {
        let versions = self
            .remote
            .run(
                Phase::ResolveMetadata,
                self.capabilities
                    .platform
                    .list_application_versions(&self.app_name),
            )
            .await?;

        let mut versions = versions.into_iter();
        let current = versions.next().ok_or_else(|| {
            RemoteOperationError::new(
                Phase::ResolveMetadata,
                PhaseFailure::NoApplicationVersions {
                    application: self.app_name.clone(),
                },
            )
        })?;

        let other_buckets: Vec<String> = versions
            .map(|version| version.source_bundle.bucket)
            .filter(|bucket| *bucket != current.source_bundle.bucket)
            .collect();
        if !other_buckets.is_empty() {
            warn!(
                application = %self.app_name,
                bucket = %current.source_bundle.bucket,
                ?other_buckets,
                "older versions live in other buckets; using the newest version's bucket"
            );
        }

        debug!(
            application = %self.app_name,
            label = %current.version_label,
            bucket = %current.source_bundle.bucket,
            "discovered current application version"
        );
        Ok(current)
    }

    /// Makes sure the bucket exists, creating the storage location if not
    ///
    /// The existence check always runs first, so calling this again after a
    /// successful creation issues no second create.
    pub async fn ensure_storage_location(&mut self) -> Result<(), RemoteOperationError> {
        let bucket = self.bucket_name().await?;

        let exists = self
            .remote
            .run(
                Phase::EnsureStorage,
                self.capabilities.storage.bucket_exists(&bucket),
            )
            .await?;
        if exists {
            debug!(%bucket, "bucket already exists");
            return Ok(());
        }

        let created = self
            .remote
            .run(Phase::EnsureStorage, self.capabilities.storage.create_bucket())
            .await?;
        if created != bucket {
            warn!(%bucket, %created, "storage location differs from the application bucket");
        }
        self.log(format!("Created storage location: {}", created));

        Ok(())
    }

    async fn fetch_source_code(&self) -> Result<Archive, RemoteOperationError> {
        let link = self
            .remote
            .run(
                Phase::ResolveArchive,
                self.capabilities
                    .archive
                    .resolve(&self.request.commit_sha, &self.request.repository),
            )
            .await?;
        let archive_url = self.capabilities.archive.normalize(&link);
        let local_path = self.archive_path();

        self.remote
            .run(
                Phase::ResolveArchive,
                self.capabilities.archive.fetch(&archive_url, &local_path),
            )
            .await?;

        Ok(Archive {
            local_path,
            remote_key: self.bucket_key(),
        })
    }

    async fn upload_source_code(
        &self,
        bucket: &str,
        archive: &Archive,
    ) -> Result<(), RemoteOperationError> {
        self.remote
            .run(
                Phase::Upload,
                self.capabilities
                    .storage
                    .put_object(bucket, &archive.remote_key, &archive.local_path),
            )
            .await
    }

    async fn create_app_version(
        &self,
        bucket: &str,
        archive: &Archive,
    ) -> Result<ApplicationVersion, RemoteOperationError> {
        let request = CreateApplicationVersion {
            application_name: self.app_name.clone(),
            version_label: version_label(&self.request.commit_sha, Utc::now()),
            description: self.request.version_description(),
            source_bundle: SourceBundle {
                bucket: bucket.to_string(),
                key: archive.remote_key.clone(),
            },
        };

        self.remote
            .run(
                Phase::RegisterVersion,
                self.capabilities.platform.create_application_version(request),
            )
            .await
    }

    async fn update_app(
        &self,
        version: &ApplicationVersion,
    ) -> Result<EnvironmentDescription, RemoteOperationError> {
        let update = EnvironmentUpdate {
            environment_name: self.environment_name(),
            version_label: version.version_label.clone(),
        };

        self.remote
            .run(
                Phase::UpdateEnvironment,
                self.capabilities.platform.update_environment(update),
            )
            .await
    }

    fn log(&mut self, message: impl Display) {
        let line = format!("{}: {}", Self::DISPLAY_NAME, message);
        info!(deployment = %self.request.identifier, "{}", line);
        self.status.log(line);
    }
}

#[async_trait]
impl Provider for ElasticBeanstalk {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn display_name(&self) -> &'static str {
        Self::DISPLAY_NAME
    }

    fn request(&self) -> &DeploymentRequest {
        &self.request
    }

    async fn execute(&mut self) -> Result<(), RemoteOperationError> {
        if self.settings.dry_run {
            self.log("Dry run, no remote operations performed");
            return Ok(());
        }

        self.log(format!("Resolving application metadata: {}", self.app_name));
        let bucket = self.bucket_name().await?;

        self.log(format!("Configuring S3 bucket: {}", bucket));
        self.ensure_storage_location().await?;

        self.log("Fetching source code from GitHub");
        let archive = self.fetch_source_code().await?;

        self.log(format!(
            "Uploading source code: {} => {}",
            archive.local_path.display(),
            archive.remote_key
        ));
        self.upload_source_code(&bucket, &archive).await?;

        self.log(format!("Creating application version: {}", self.app_name));
        let version = self.create_app_version(&bucket, &archive).await?;

        self.log(format!(
            "Updating application environment: {}",
            self.environment_name()
        ));
        let environment = self.update_app(&version).await?;

        info!(
            deployment = %self.request.identifier,
            environment = %environment.environment_name,
            label = %version.version_label,
            "deployment submitted"
        );
        self.environment_id = Some(environment.environment_id);

        Ok(())
    }

    fn notify(&mut self) {
        let output = match &self.environment_id {
            Some(environment_id) => self.dashboard_url(environment_id),
            None => format!("{}: dry run, nothing deployed", Self::DISPLAY_NAME),
        };
        self.status.set_output(output);
        self.status.succeed();
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }
}
