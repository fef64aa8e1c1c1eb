//! Timeout and cancellation around remote calls

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{Phase, PhaseFailure, RemoteOperationError};

/// Wraps each remote call of a run with the run's timeout and cancel token
#[derive(Debug, Clone)]
pub struct RemoteCall {
    timeout: Duration,
    cancel: CancellationToken,
}

impl RemoteCall {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// Runs `call` as part of `phase`
    ///
    /// A cancelled token wins over the call, so once cancellation is
    /// requested no further remote call is started.
    pub async fn run<T, E, F>(&self, phase: Phase, call: F) -> Result<T, RemoteOperationError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<PhaseFailure>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(%phase, "remote call cancelled");
                Err(RemoteOperationError::new(phase, PhaseFailure::Cancelled))
            }
            outcome = tokio::time::timeout(self.timeout, call) => match outcome {
                Ok(result) => result.map_err(|e| RemoteOperationError::new(phase, e)),
                Err(_) => {
                    warn!(%phase, timeout = ?self.timeout, "remote call timed out");
                    Err(RemoteOperationError::new(phase, PhaseFailure::TimedOut(self.timeout)))
                }
            },
        }
    }
}
