//! Domain-level input errors.

use checkin_shared::{ErrorCode, ErrorEnvelope};
use std::fmt;

/// Rejected domain input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Field name did not match any form field.
    UnknownField {
        /// Raw input, trimmed.
        input: String,
    },
    /// Passenger id was empty or not a UUID.
    InvalidPassengerId {
        /// Raw input, trimmed.
        input: String,
    },
    /// Taken-username list contained an empty entry.
    EmptyUsername {
        /// Position of the entry in the list.
        index: usize,
    },
}

impl DomainError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownField { .. } => ErrorCode::new("domain", "unknown_field"),
            Self::InvalidPassengerId { .. } => ErrorCode::new("domain", "invalid_passenger_id"),
            Self::EmptyUsername { .. } => ErrorCode::new("domain", "empty_username"),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { input } => write!(
                formatter,
                "unknown field `{input}` (expected fullName, email, username, or seat)"
            ),
            Self::InvalidPassengerId { input } => {
                write!(formatter, "passenger id `{input}` is not a UUID")
            },
            Self::EmptyUsername { index } => {
                write!(formatter, "taken username at position {index} is empty")
            },
        }
    }
}

impl std::error::Error for DomainError {}

impl From<DomainError> for ErrorEnvelope {
    fn from(error: DomainError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);
        match error {
            DomainError::UnknownField { input } | DomainError::InvalidPassengerId { input } => {
                envelope.with_metadata("input", input)
            },
            DomainError::EmptyUsername { index } => {
                envelope.with_metadata("index", index.to_string())
            },
        }
    }
}
