//! Source archive domain types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A commit archive fetched to local disk, waiting to be uploaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    pub local_path: PathBuf,
    /// Object key the archive is uploaded under
    pub remote_key: String,
}

/// Archive file name for a commit
///
/// Deterministic so that repeated uploads for the same commit overwrite the
/// same object instead of accumulating new ones.
pub fn archive_name(commit_sha: &str) -> String {
    format!("heaven-{}.zip", commit_sha)
}
