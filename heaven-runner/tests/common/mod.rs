//! Shared test doubles for provider tests.
//!
//! `MockCloud` implements every capability trait against in-memory state
//! and records each remote call in order.

#![allow(dead_code)]

use async_trait::async_trait;
use heaven_client::{ArchiveResolver, ClientError, PlatformClient, StorageClient};
use heaven_core::domain::deployment::DeploymentRequest;
use heaven_core::domain::version::{
    ApplicationVersion, CreateApplicationVersion, EnvironmentDescription, EnvironmentUpdate,
    SourceBundle,
};
use heaven_runner::{Capabilities, ProviderSettings};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ENVIRONMENT_ID: &str = "e-abc123xyz";

/// A remote call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListVersions(String),
    BucketExists(String),
    CreateBucket,
    Resolve { sha: String, repository: String },
    Fetch { url: String, destination: PathBuf },
    PutObject { bucket: String, key: String, local_path: PathBuf },
    CreateVersion(CreateApplicationVersion),
    UpdateEnvironment(EnvironmentUpdate),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    buckets: HashSet<String>,
    versions: Vec<ApplicationVersion>,
    provisioned_bucket: Option<String>,
    missing_source: bool,
    fail_upload: bool,
    platform_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct MockCloud {
    state: Arc<Mutex<State>>,
}

impl MockCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, name: &str) -> Self {
        self.state.lock().unwrap().buckets.insert(name.to_string());
        self
    }

    pub fn with_version(self, application: &str, label: &str, bucket: &str) -> Self {
        self.state.lock().unwrap().versions.push(ApplicationVersion {
            application_name: application.to_string(),
            version_label: label.to_string(),
            source_bundle: SourceBundle {
                bucket: bucket.to_string(),
                key: format!("{}/{}.zip", application, label),
            },
        });
        self
    }

    /// Bucket name `create_bucket` provisions
    pub fn provisions(self, bucket: &str) -> Self {
        self.state.lock().unwrap().provisioned_bucket = Some(bucket.to_string());
        self
    }

    pub fn missing_source(self) -> Self {
        self.state.lock().unwrap().missing_source = true;
        self
    }

    pub fn failing_upload(self) -> Self {
        self.state.lock().unwrap().fail_upload = true;
        self
    }

    pub fn slow_platform(self, delay: Duration) -> Self {
        self.state.lock().unwrap().platform_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            archive: Arc::new(self.clone()),
            storage: Arc::new(self.clone()),
            platform: Arc::new(self.clone()),
        }
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    async fn platform_delay(&self) {
        let delay = self.state.lock().unwrap().platform_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ArchiveResolver for MockCloud {
    async fn resolve(&self, commit_sha: &str, repository: &str) -> heaven_client::Result<String> {
        self.record(Call::Resolve {
            sha: commit_sha.to_string(),
            repository: repository.to_string(),
        });

        if self.state.lock().unwrap().missing_source {
            return Err(ClientError::SourceNotFound {
                repository: repository.to_string(),
                commit_sha: commit_sha.to_string(),
            });
        }

        Ok(format!(
            "https://codeload.github.com/{}/legacy.tar.gz/{}",
            repository, commit_sha
        ))
    }

    async fn fetch(&self, archive_url: &str, destination: &Path) -> heaven_client::Result<()> {
        self.record(Call::Fetch {
            url: archive_url.to_string(),
            destination: destination.to_path_buf(),
        });

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(destination, b"PK\x03\x04")?;
        Ok(())
    }
}

#[async_trait]
impl StorageClient for MockCloud {
    async fn bucket_exists(&self, name: &str) -> heaven_client::Result<bool> {
        self.record(Call::BucketExists(name.to_string()));
        Ok(self.state.lock().unwrap().buckets.contains(name))
    }

    async fn create_bucket(&self) -> heaven_client::Result<String> {
        self.record(Call::CreateBucket);

        let mut state = self.state.lock().unwrap();
        let bucket = state
            .provisioned_bucket
            .clone()
            .or_else(|| {
                state
                    .versions
                    .first()
                    .map(|version| version.source_bundle.bucket.clone())
            })
            .unwrap_or_else(|| "elasticbeanstalk-us-east-1-000000000000".to_string());
        state.buckets.insert(bucket.clone());
        Ok(bucket)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> heaven_client::Result<()> {
        self.record(Call::PutObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            local_path: local_path.to_path_buf(),
        });

        if self.state.lock().unwrap().fail_upload {
            return Err(ClientError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "Access Denied".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformClient for MockCloud {
    async fn list_application_versions(
        &self,
        application_name: &str,
    ) -> heaven_client::Result<Vec<ApplicationVersion>> {
        self.record(Call::ListVersions(application_name.to_string()));
        self.platform_delay().await;

        let state = self.state.lock().unwrap();
        Ok(state
            .versions
            .iter()
            .filter(|version| version.application_name == application_name)
            .cloned()
            .collect())
    }

    async fn create_application_version(
        &self,
        request: CreateApplicationVersion,
    ) -> heaven_client::Result<ApplicationVersion> {
        self.record(Call::CreateVersion(request.clone()));

        let version = ApplicationVersion {
            application_name: request.application_name,
            version_label: request.version_label,
            source_bundle: request.source_bundle,
        };
        self.state.lock().unwrap().versions.insert(0, version.clone());
        Ok(version)
    }

    async fn update_environment(
        &self,
        update: EnvironmentUpdate,
    ) -> heaven_client::Result<EnvironmentDescription> {
        self.record(Call::UpdateEnvironment(update.clone()));

        Ok(EnvironmentDescription {
            environment_id: ENVIRONMENT_ID.to_string(),
            environment_name: update.environment_name,
            version_label: Some(update.version_label),
        })
    }
}

/// Request for `acme/shop` at `abc123` targeting `prod`
pub fn request(custom_config: JsonValue) -> DeploymentRequest {
    let JsonValue::Object(config) = custom_config else {
        panic!("custom config must be a JSON object");
    };
    DeploymentRequest::new("42", "abc123", "acme/shop", "prod", config)
}

pub fn settings(workspace: &Path) -> ProviderSettings {
    ProviderSettings::new(workspace)
}
