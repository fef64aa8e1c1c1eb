//! Heaven capability clients
//!
//! Thin wrappers around the remote systems a provider pipeline drives:
//!
//! - [`ArchiveResolver`]: source control archive lookup and download (GitHub)
//! - [`StorageClient`]: object storage for source bundles (S3)
//! - [`PlatformClient`]: application versions and environments (Elastic Beanstalk)
//!
//! Each capability is a trait so pipelines can be exercised against
//! in-memory doubles. The concrete clients hold only connection and
//! credential configuration and are safe to share across runs.
//!
//! # Example
//!
//! ```no_run
//! use heaven_client::{AwsClients, AwsCredentials, StorageClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = AwsCredentials::new("AKIA...", "secret");
//!     let aws = AwsClients::connect("us-east-1", &credentials).await;
//!
//!     let exists = aws.storage().bucket_exists("myapp-bucket").await?;
//!     println!("bucket exists: {}", exists);
//!     Ok(())
//! }
//! ```

pub mod aws;
pub mod error;
pub mod platform;
pub mod source;
pub mod storage;

// Re-export commonly used types
pub use aws::{AwsClients, AwsCredentials};
pub use error::{ClientError, Result};
pub use platform::{BeanstalkPlatform, PlatformClient};
pub use source::{ArchiveResolver, GithubArchiveResolver, normalize_archive_url};
pub use storage::{S3Storage, StorageClient};
