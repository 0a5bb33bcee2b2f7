//! Per-field validation outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of validating one form field.
///
/// `Invalid` is a user-facing outcome, not an error: it carries the message
/// the form shows next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum ValidationResult {
    /// The value is acceptable.
    Valid,
    /// The value was rejected for the given reason.
    Invalid(Box<str>),
    /// An asynchronous check is in flight.
    Checking,
}

impl ValidationResult {
    /// Rejection with a message.
    pub fn invalid(message: impl Into<Box<str>>) -> Self {
        Self::Invalid(message.into())
    }

    /// Returns true for [`ValidationResult::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns true for [`ValidationResult::Checking`].
    #[must_use]
    pub const fn is_checking(&self) -> bool {
        matches!(self, Self::Checking)
    }

    /// Rejection message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Invalid(message) => Some(message),
            Self::Valid | Self::Checking => None,
        }
    }

    /// Short status tag (`valid`, `invalid`, `checking`).
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid(_) => "invalid",
            Self::Checking => "checking",
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => formatter.write_str("VALID"),
            Self::Invalid(message) => write!(formatter, "INVALID: {message}"),
            Self::Checking => formatter.write_str("CHECKING..."),
        }
    }
}
