//! # checkin-shared
//!
//! Foundation types used by every other crate in the check-in workspace:
//!
//! - [`ErrorEnvelope`] and the workspace [`Result`] alias
//! - [`RequestContext`] for correlation and hierarchical cancellation
//! - [`timeout_with_context`] and [`retry_async`] for collaborator calls
//! - redaction helpers for passenger data in logs
//!
//! This crate has no workspace dependencies.

pub mod concurrency;
pub mod errors;
pub mod redaction;
pub mod result;
pub mod retry;
pub mod timeout;

pub use concurrency::{CorrelationId, RequestContext};
pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use redaction::{REDACTED, is_sensitive_key, mask_email, redact_for_key};
pub use result::Result;
pub use retry::{RetryPolicy, retry_async, retry_async_with_observer};
pub use timeout::timeout_with_context;
pub use tokio_util::sync::CancellationToken;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_version_is_set() {
        assert!(!shared_crate_version().is_empty());
    }

    fn dependency_keys(manifest: &str) -> Vec<&str> {
        let mut keys = Vec::new();
        let mut in_deps = false;
        for raw_line in manifest.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.starts_with('[') {
                in_deps = line.ends_with("dependencies]");
                continue;
            }
            if !in_deps {
                continue;
            }
            if let Some((key, _)) = line.split_once('=') {
                keys.push(key.split('.').next().unwrap_or("").trim());
            }
        }
        keys
    }

    #[test]
    fn shared_crate_has_no_workspace_dependencies() {
        let keys = dependency_keys(include_str!("../Cargo.toml"));
        assert!(keys.contains(&"tokio-util"));
        assert!(
            keys.iter().all(|key| !key.starts_with("checkin-")),
            "shared must stay a leaf crate: {keys:?}"
        );
    }

    #[test]
    fn package_metadata_does_not_count_as_a_dependency() {
        let manifest = "[package]\ndescription = \"for checkin-forms\"\n\n[dependencies]\nserde.workspace = true\n";
        assert_eq!(dependency_keys(manifest), ["serde"]);
    }
}
