//! Deployment request domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Region used when the request carries no `aws.region` override
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// SHA-256 object ids are the longest commit ids source control hands out
const MAX_SHA_LEN: usize = 64;

/// Why a deployment request was rejected
///
/// Identifier, commit and repository end up in local paths, object keys and
/// API URLs, so they are restricted to characters that cannot change the
/// shape of any of those.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{0} is empty")]
    Empty(&'static str),

    #[error("commit sha must be hexadecimal: {0:?}")]
    InvalidSha(String),

    #[error("identifier must be a single path component: {0:?}")]
    InvalidIdentifier(String),

    #[error("repository must be in owner/name form: {0:?}")]
    InvalidRepository(String),
}

/// Immutable description of what to deploy
///
/// Built by the outer system from a webhook or queue payload and owned by a
/// single provider run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub identifier: String,
    pub commit_sha: String,
    /// Repository in `owner/name` form
    pub repository: String,
    pub environment: String,
    pub description: Option<String>,
    pub custom_config: Map<String, JsonValue>,
}

impl DeploymentRequest {
    pub fn new(
        identifier: impl Into<String>,
        commit_sha: impl Into<String>,
        repository: impl Into<String>,
        environment: impl Into<String>,
        custom_config: Map<String, JsonValue>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            commit_sha: commit_sha.into(),
            repository: repository.into(),
            environment: environment.into(),
            description: None,
            custom_config,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Application name from the custom configuration (`app_name`)
    pub fn app_name(&self) -> Option<&str> {
        self.custom_config
            .get("app_name")
            .and_then(JsonValue::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Region override under `aws.region`, falling back to `us-east-1`
    pub fn aws_region(&self) -> &str {
        self.aws_setting("region").unwrap_or(DEFAULT_AWS_REGION)
    }

    /// Explicit bucket under `aws.bucket`, if the requester pinned one
    pub fn bucket_override(&self) -> Option<&str> {
        self.aws_setting("bucket")
    }

    /// Description attached to created application versions
    pub fn version_description(&self) -> String {
        match &self.description {
            Some(description) if !description.is_empty() => description.clone(),
            _ => format!("Deployed by heaven: {}", self.commit_sha),
        }
    }

    /// Checks the fields that flow into paths, keys and URLs
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.identifier.trim().is_empty() {
            return Err(RequestError::Empty("identifier"));
        }
        if !is_path_component(&self.identifier) {
            return Err(RequestError::InvalidIdentifier(self.identifier.clone()));
        }

        if self.commit_sha.trim().is_empty() {
            return Err(RequestError::Empty("commit sha"));
        }
        if self.commit_sha.len() > MAX_SHA_LEN
            || !self.commit_sha.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(RequestError::InvalidSha(self.commit_sha.clone()));
        }

        if self.repository.trim().is_empty() {
            return Err(RequestError::Empty("repository"));
        }
        match self.repository.split_once('/') {
            Some((owner, name)) if is_path_component(owner) && is_path_component(name) => {}
            _ => return Err(RequestError::InvalidRepository(self.repository.clone())),
        }

        if self.environment.trim().is_empty() {
            return Err(RequestError::Empty("environment"));
        }

        Ok(())
    }

    fn aws_setting(&self, key: &str) -> Option<&str> {
        self.custom_config
            .get("aws")
            .and_then(|aws| aws.get(key))
            .and_then(JsonValue::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Letters, digits, `-`, `_` and `.`, but not `.` or `..` on their own
fn is_path_component(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
