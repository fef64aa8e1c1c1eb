//! Remote storage capability

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// Object storage operations a provider needs
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Whether a bucket with this name exists and is reachable
    async fn bucket_exists(&self, name: &str) -> Result<bool>;

    /// Provisions the account's storage location
    ///
    /// The bucket is chosen by the remote API from account and region
    /// configuration; its name is returned.
    async fn create_bucket(&self) -> Result<String>;

    /// Uploads a local file, overwriting any existing object at `key`
    async fn put_object(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()>;
}

/// S3-backed storage; provisioning goes through Elastic Beanstalk
#[derive(Debug, Clone)]
pub struct S3Storage {
    s3: aws_sdk_s3::Client,
    beanstalk: aws_sdk_elasticbeanstalk::Client,
}

impl S3Storage {
    pub fn new(s3: aws_sdk_s3::Client, beanstalk: aws_sdk_elasticbeanstalk::Client) -> Self {
        Self { s3, beanstalk }
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn bucket_exists(&self, name: &str) -> Result<bool> {
        match self.s3.head_bucket().bucket(name).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {
                debug!(bucket = name, "bucket not found");
                Ok(false)
            }
            Err(err) => Err(ClientError::StorageProvision {
                message: format!(
                    "failed to look up bucket {}: {}",
                    name,
                    DisplayErrorContext(&err)
                ),
            }),
        }
    }

    async fn create_bucket(&self) -> Result<String> {
        let output = self
            .beanstalk
            .create_storage_location()
            .send()
            .await
            .map_err(|err| ClientError::StorageProvision {
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let bucket = output
            .s3_bucket()
            .ok_or_else(|| ClientError::StorageProvision {
                message: "storage location response carried no bucket".to_string(),
            })?
            .to_string();

        info!(%bucket, "storage location created");
        Ok(bucket)
    }

    async fn put_object(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        let upload_error = |message: String| ClientError::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        };

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/zip")
            .body(body)
            .send()
            .await
            .map_err(|err| upload_error(DisplayErrorContext(&err).to_string()))?;

        info!(bucket, key, "object uploaded");
        Ok(())
    }
}
