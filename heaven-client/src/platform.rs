//! Platform (PaaS) capability

use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_elasticbeanstalk::types::{ApplicationVersionDescription, S3Location};
use heaven_core::domain::version::{
    ApplicationVersion, CreateApplicationVersion, EnvironmentDescription, EnvironmentUpdate,
    SourceBundle,
};
use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// Longest description the platform accepts
const MAX_DESCRIPTION_LEN: usize = 200;

/// Application version and environment operations a provider needs
///
/// All operations fail with `ClientError::PlatformApi` carrying the
/// provider's error code.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Lists the application's versions, newest first
    async fn list_application_versions(
        &self,
        application_name: &str,
    ) -> Result<Vec<ApplicationVersion>>;

    /// Registers a new application version
    async fn create_application_version(
        &self,
        request: CreateApplicationVersion,
    ) -> Result<ApplicationVersion>;

    /// Points an environment at a version label
    async fn update_environment(&self, update: EnvironmentUpdate) -> Result<EnvironmentDescription>;
}

/// Elastic Beanstalk implementation of `PlatformClient`
#[derive(Debug, Clone)]
pub struct BeanstalkPlatform {
    client: aws_sdk_elasticbeanstalk::Client,
}

impl BeanstalkPlatform {
    pub fn new(client: aws_sdk_elasticbeanstalk::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlatformClient for BeanstalkPlatform {
    async fn list_application_versions(
        &self,
        application_name: &str,
    ) -> Result<Vec<ApplicationVersion>> {
        let output = self
            .client
            .describe_application_versions()
            .application_name(application_name)
            .send()
            .await
            .map_err(|err| platform_error("DescribeApplicationVersions", err))?;

        let versions: Vec<ApplicationVersion> = output
            .application_versions()
            .iter()
            .filter_map(version_from_description)
            .collect();

        debug!(
            application = application_name,
            count = versions.len(),
            "described application versions"
        );
        Ok(versions)
    }

    async fn create_application_version(
        &self,
        request: CreateApplicationVersion,
    ) -> Result<ApplicationVersion> {
        let bundle = S3Location::builder()
            .s3_bucket(&request.source_bundle.bucket)
            .s3_key(&request.source_bundle.key)
            .build();

        let output = self
            .client
            .create_application_version()
            .application_name(&request.application_name)
            .version_label(&request.version_label)
            .description(truncate_description(&request.description))
            .source_bundle(bundle)
            .auto_create_application(false)
            .send()
            .await
            .map_err(|err| platform_error("CreateApplicationVersion", err))?;

        let version = output
            .application_version()
            .and_then(version_from_description)
            .ok_or_else(|| {
                ClientError::platform(
                    "CreateApplicationVersion",
                    "response carried no application version",
                )
            })?;

        info!(
            application = %version.application_name,
            label = %version.version_label,
            "application version created"
        );
        Ok(version)
    }

    async fn update_environment(&self, update: EnvironmentUpdate) -> Result<EnvironmentDescription> {
        let output = self
            .client
            .update_environment()
            .environment_name(&update.environment_name)
            .version_label(&update.version_label)
            .send()
            .await
            .map_err(|err| platform_error("UpdateEnvironment", err))?;

        let environment_id = output
            .environment_id()
            .ok_or_else(|| {
                ClientError::platform("UpdateEnvironment", "response carried no environment id")
            })?
            .to_string();

        info!(
            environment = %update.environment_name,
            %environment_id,
            "environment update requested"
        );

        Ok(EnvironmentDescription {
            environment_id,
            environment_name: output
                .environment_name()
                .unwrap_or(&update.environment_name)
                .to_string(),
            version_label: output.version_label().map(str::to_string),
        })
    }
}

fn platform_error<E, R>(operation: &str, err: SdkError<E, R>) -> ClientError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    ClientError::PlatformApi {
        operation: operation.to_string(),
        code: err.code().map(str::to_string),
        message: DisplayErrorContext(&err).to_string(),
    }
}

/// Maps an SDK version description, skipping entries without a source bundle
fn version_from_description(
    description: &ApplicationVersionDescription,
) -> Option<ApplicationVersion> {
    let bundle = description.source_bundle()?;
    Some(ApplicationVersion {
        application_name: description.application_name()?.to_string(),
        version_label: description.version_label()?.to_string(),
        source_bundle: SourceBundle {
            bucket: bundle.s3_bucket()?.to_string(),
            key: bundle.s3_key()?.to_string(),
        },
    })
}

fn truncate_description(description: &str) -> String {
    description.chars().take(MAX_DESCRIPTION_LEN).collect()
}
