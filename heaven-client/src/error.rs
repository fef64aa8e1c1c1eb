//! Error types for the capability clients

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by the source-control, storage and platform clients
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an unexpected status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Source control has no archive for the commit
    #[error("no source archive for {repository}@{commit_sha}")]
    SourceNotFound {
        repository: String,
        commit_sha: String,
    },

    /// Archive download failed
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// Storage location could not be checked or provisioned
    #[error("storage provisioning failed: {message}")]
    StorageProvision { message: String },

    /// Object upload failed
    #[error("failed to upload s3://{bucket}/{key}: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    /// Platform API call failed
    #[error("{operation} failed ({}): {message}", .code.as_deref().unwrap_or("no error code"))]
    PlatformApi {
        /// Remote operation name, e.g. `UpdateEnvironment`
        operation: String,
        /// Provider error code, when the platform returned one
        code: Option<String>,
        message: String,
    },

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create a platform error without a provider error code
    pub fn platform(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PlatformApi {
            operation: operation.into(),
            code: None,
            message: message.into(),
        }
    }
}
