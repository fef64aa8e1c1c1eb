//! Application version and environment domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide sequence mixed into version labels
static LABEL_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Location of an uploaded source bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBundle {
    pub bucket: String,
    pub key: String,
}

/// A platform-tracked record binding a version label to a source bundle
///
/// Labels are never mutated once the version exists; later runs only
/// reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationVersion {
    pub application_name: String,
    pub version_label: String,
    pub source_bundle: SourceBundle,
}

/// Request to register a new application version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateApplicationVersion {
    pub application_name: String,
    pub version_label: String,
    pub description: String,
    pub source_bundle: SourceBundle,
}

/// Point an environment at a version label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentUpdate {
    pub environment_name: String,
    pub version_label: String,
}

/// What the platform reports back after an environment update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDescription {
    pub environment_id: String,
    pub environment_name: String,
    pub version_label: Option<String>,
}

/// Version label for a new application version of `commit_sha`
///
/// Format: `heaven-{sha}-{unix_secs}.{micros}-{seq}`. The sequence number is
/// monotonic within the process, so two labels minted at the same instant for
/// the same commit still differ and a stale version left by an earlier failed
/// run can never collide with a fresh one.
pub fn version_label(commit_sha: &str, now: DateTime<Utc>) -> String {
    let seq = LABEL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "heaven-{}-{}.{:06}-{}",
        commit_sha,
        now.timestamp(),
        now.timestamp_subsec_micros(),
        seq
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_version_label_prefix() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let label = version_label("abc123", now);
        assert!(label.starts_with("heaven-abc123-1714564800."));
    }

    #[test]
    fn test_version_label_unique_within_same_second() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let first = version_label("abc123", now);
        let second = version_label("abc123", now);
        assert_ne!(first, second);
        assert!(first.starts_with("heaven-abc123-"));
        assert!(second.starts_with("heaven-abc123-"));
    }

    #[test]
    fn test_version_label_fits_platform_limit() {
        let sha = "f".repeat(40);
        let label = version_label(&sha, Utc::now());
        assert!(label.len() <= 100);
    }
}
