//! Passenger record captured by the check-in form.

use crate::{DomainError, FormField};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier for a passenger record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassengerId(Box<str>);

impl PassengerId {
    /// Fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string().into_boxed_str())
    }

    /// Parse a stored or user-supplied id.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = value.as_ref().trim();
        Uuid::parse_str(trimmed)
            .map(|uuid| Self(uuid.to_string().into_boxed_str()))
            .map_err(|_| DomainError::InvalidPassengerId {
                input: trimmed.to_owned(),
            })
    }

    /// Borrow the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PassengerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// A passenger being checked in. Every text field starts empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    /// Record id.
    pub id: PassengerId,
    /// Full name as typed.
    #[serde(default)]
    pub full_name: String,
    /// Contact email as typed.
    #[serde(default)]
    pub email: String,
    /// Username as typed.
    #[serde(default)]
    pub username: String,
    /// Seat as typed.
    #[serde(default)]
    pub seat: String,
}

impl Passenger {
    /// Empty passenger with a generated id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(PassengerId::generate())
    }

    /// Empty passenger with the given id.
    #[must_use]
    pub const fn with_id(id: PassengerId) -> Self {
        Self {
            id,
            full_name: String::new(),
            email: String::new(),
            username: String::new(),
            seat: String::new(),
        }
    }

    /// Current raw value of `field`.
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FullName => &self.full_name,
            FormField::Email => &self.email,
            FormField::Username => &self.username,
            FormField::Seat => &self.seat,
        }
    }

    /// Overwrite `field` with `value`.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::FullName => &mut self.full_name,
            FormField::Email => &mut self.email,
            FormField::Username => &mut self.username,
            FormField::Seat => &mut self.seat,
        };
        *slot = value.into();
    }

    /// Name for listings; `"Unnamed"` until a name is entered.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.full_name.trim();
        if name.is_empty() { "Unnamed" } else { name }
    }

    /// Listing view of this record.
    #[must_use]
    pub fn summary(&self) -> PassengerSummary {
        let email = self.email.trim();
        PassengerSummary {
            id: self.id.clone(),
            display_name: self.display_name().into(),
            email: (!email.is_empty()).then(|| email.into()),
        }
    }
}

impl Default for Passenger {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of the recent-passengers listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerSummary {
    /// Record id.
    pub id: PassengerId,
    /// Name or `"Unnamed"`.
    pub display_name: Box<str>,
    /// Email, omitted when blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Box<str>>,
}
