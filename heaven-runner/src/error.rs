//! Error types for provider runs

use heaven_client::ClientError;
use heaven_core::domain::deployment::RequestError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Pipeline phase, used as error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Discovering the bucket from existing application versions
    ResolveMetadata,
    /// Checking for, and if needed creating, the storage bucket
    EnsureStorage,
    /// Looking up and downloading the commit archive
    ResolveArchive,
    /// Uploading the archive as a source bundle
    Upload,
    /// Creating the application version
    RegisterVersion,
    /// Pointing the environment at the new version
    UpdateEnvironment,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolveMetadata => write!(f, "resolve_metadata"),
            Self::EnsureStorage => write!(f, "ensure_storage"),
            Self::ResolveArchive => write!(f, "resolve_archive"),
            Self::Upload => write!(f, "upload"),
            Self::RegisterVersion => write!(f, "register_version"),
            Self::UpdateEnvironment => write!(f, "update_environment"),
        }
    }
}

/// Why a phase failed
#[derive(Debug, Error)]
pub enum PhaseFailure {
    /// A capability client call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// No existing version to discover the bucket from
    #[error("application {application} has no versions to discover a bucket from; set aws.bucket to pin one")]
    NoApplicationVersions { application: String },

    /// The run was cancelled at a remote-call boundary
    #[error("cancelled")]
    Cancelled,

    /// A remote call exceeded the per-call timeout
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// A provider run aborted in `phase`
#[derive(Debug, Error)]
#[error("{phase} failed")]
pub struct RemoteOperationError {
    pub phase: Phase,
    #[source]
    pub cause: PhaseFailure,
}

impl RemoteOperationError {
    pub fn new(phase: Phase, cause: impl Into<PhaseFailure>) -> Self {
        Self {
            phase,
            cause: cause.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.cause, PhaseFailure::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.cause, PhaseFailure::TimedOut(_))
    }
}

/// Errors raised before a provider starts running
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid deployment request: {0}")]
    InvalidRequest(String),

    #[error("invalid deployment request")]
    Request(#[from] RequestError),
}
