//! Deployment payload DTOs
//!
//! Shape of the deployment event the outer system receives from the
//! source-control webhook or the job queue.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::domain::deployment::{DeploymentRequest, RequestError};

/// Inbound deployment event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentPayload {
    pub deployment: DeploymentInfo,
    pub repository: RepositoryInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentInfo {
    #[serde(default)]
    pub id: JsonValue,
    pub sha: String,
    pub environment: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form provider configuration (`config`, `aws`, ...)
    #[serde(default)]
    pub payload: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub full_name: String,
}

impl DeploymentPayload {
    /// Converts the event into a deployment request
    ///
    /// Entries of `payload.config` are lifted to the top level of the custom
    /// configuration so that `payload.config.app_name` becomes `app_name`;
    /// every other payload key (notably `aws`) is kept as is.
    ///
    /// # Errors
    /// Any `RequestError` from [`DeploymentRequest::validate`].
    pub fn into_request(self) -> Result<DeploymentRequest, RequestError> {
        let DeploymentPayload {
            deployment,
            repository,
        } = self;

        let identifier = match &deployment.id {
            JsonValue::String(id) => id.clone(),
            JsonValue::Null => uuid::Uuid::new_v4().to_string(),
            other => other.to_string(),
        };

        let mut custom_config = deployment.payload;
        if let Some(JsonValue::Object(config)) = custom_config.remove("config") {
            for (key, value) in config {
                custom_config.insert(key, value);
            }
        }

        let mut request = DeploymentRequest::new(
            identifier,
            deployment.sha,
            repository.full_name,
            deployment.environment,
            custom_config,
        );
        if let Some(description) = deployment.description {
            request = request.with_description(description);
        }

        request.validate()?;
        Ok(request)
    }
}
