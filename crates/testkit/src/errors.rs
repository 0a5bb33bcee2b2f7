//! Error fixtures shared by tests.

use checkin_shared::{ErrorClass, ErrorCode, ErrorEnvelope};

/// A retriable lookup timeout, as produced by `timeout_with_context`.
pub fn lookup_timeout_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::timeout(),
        "username.lookup timed out",
        ErrorClass::Retriable,
    )
}

/// A directory outage that retrying will not fix.
pub fn directory_down_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("username", "directory_unavailable"),
        "username directory unavailable",
        ErrorClass::NonRetriable,
    )
}

/// A disk failure from a passenger store.
pub fn store_io_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(ErrorCode::io(), "disk full", ErrorClass::NonRetriable)
}
