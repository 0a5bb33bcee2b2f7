//! Username directory boundary.

use crate::BoxFuture;
use checkin_domain::ValidationResult;
use checkin_shared::{RequestContext, Result};
use serde::{Deserialize, Serialize};

/// Directory verdict for one username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UsernameAvailability {
    /// Nobody holds the username.
    Available,
    /// The username is held; `reason` is shown to the passenger.
    Taken {
        /// User-facing reason.
        reason: Box<str>,
    },
}

impl UsernameAvailability {
    /// Field result for this verdict.
    #[must_use]
    pub fn into_validation(self) -> ValidationResult {
        match self {
            Self::Available => ValidationResult::Valid,
            Self::Taken { reason } => ValidationResult::Invalid(reason),
        }
    }
}

/// Asynchronous username availability lookup.
///
/// Errors are reserved for lookup failures (timeouts, unreachable
/// directory). A taken username is a successful lookup.
pub trait UsernameLookupPort: Send + Sync {
    /// Look up `username`. Implementations should honour `ctx` cancellation.
    fn check_username(
        &self,
        ctx: &RequestContext,
        username: Box<str>,
    ) -> BoxFuture<'_, Result<UsernameAvailability>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_maps_onto_field_results() {
        assert_eq!(
            UsernameAvailability::Available.into_validation(),
            ValidationResult::Valid
        );
        assert_eq!(
            UsernameAvailability::Taken {
                reason: "Username taken at Gate M72".into()
            }
            .into_validation(),
            ValidationResult::invalid("Username taken at Gate M72")
        );
    }
}
