//! AWS SDK wiring
//!
//! Builds the S3 and Elastic Beanstalk clients from explicit credentials and
//! a region, so nothing is read from the process environment here.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use tracing::debug;

use crate::platform::BeanstalkPlatform;
use crate::storage::S3Storage;

/// Static access keys for the deployment account
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Loads an SDK configuration for `region` using `credentials`
pub async fn load_sdk_config(region: &str, credentials: &AwsCredentials) -> SdkConfig {
    debug!(region, "loading AWS SDK configuration");

    let provider = Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        None,
        None,
        "heaven",
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(provider)
        .load()
        .await
}

/// S3 and Elastic Beanstalk clients for one region
#[derive(Debug, Clone)]
pub struct AwsClients {
    s3: aws_sdk_s3::Client,
    beanstalk: aws_sdk_elasticbeanstalk::Client,
}

impl AwsClients {
    /// Connects to `region` with the given credentials
    pub async fn connect(region: &str, credentials: &AwsCredentials) -> Self {
        let config = load_sdk_config(region, credentials).await;
        Self::from_sdk_config(&config)
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self {
            s3: aws_sdk_s3::Client::new(config),
            beanstalk: aws_sdk_elasticbeanstalk::Client::new(config),
        }
    }

    /// Remote storage capability
    pub fn storage(&self) -> S3Storage {
        S3Storage::new(self.s3.clone(), self.beanstalk.clone())
    }

    /// Platform capability
    pub fn platform(&self) -> BeanstalkPlatform {
        BeanstalkPlatform::new(self.beanstalk.clone())
    }
}
