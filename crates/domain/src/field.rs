//! The four fields of the check-in form.

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A field on the passenger check-in form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    /// Passenger's full name.
    FullName,
    /// Contact email.
    Email,
    /// Account username, checked against the directory.
    Username,
    /// Seat assignment.
    Seat,
}

impl FormField {
    /// Fields in form order.
    pub const ALL: [Self; 4] = [Self::FullName, Self::Email, Self::Username, Self::Seat];

    /// Key used in the validation state map and on the wire.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Username => "username",
            Self::Seat => "seat",
        }
    }

    /// Label used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Email => "Email",
            Self::Username => "Username",
            Self::Seat => "Seat",
        }
    }

    /// Username is the only field validated asynchronously.
    #[must_use]
    pub const fn is_debounced(self) -> bool {
        matches!(self, Self::Username)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.key())
    }
}

impl FromStr for FormField {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let normalized: String = trimmed
            .chars()
            .filter(|ch| !matches!(ch, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "fullname" | "name" => Ok(Self::FullName),
            "email" => Ok(Self::Email),
            "username" => Ok(Self::Username),
            "seat" => Ok(Self::Seat),
            _ => Err(DomainError::UnknownField {
                input: trimmed.to_owned(),
            }),
        }
    }
}
