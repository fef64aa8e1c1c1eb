//! Heaven Runner
//!
//! Executes deployment requests against their deployment target.
//!
//! Architecture:
//! - Configuration: settings and credentials loaded from the environment
//! - Providers: one pipeline per deployment target, looked up by name
//! - Deploy: runs a provider end to end and reports the outcome
//!
//! A run is strictly sequential; each step feeds the next. Independent
//! runs share nothing mutable and may execute concurrently.

pub mod config;
pub mod deploy;
pub mod error;
pub mod provider;

pub use config::Config;
pub use deploy::{DeploymentOutcome, connect_capabilities, run_deployment};
pub use error::{Phase, PhaseFailure, ProviderError, RemoteOperationError};
pub use provider::{Capabilities, ElasticBeanstalk, Provider, ProviderSettings};
