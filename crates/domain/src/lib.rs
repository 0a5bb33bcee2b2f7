//! # checkin-domain
//!
//! Domain model for passenger check-in:
//!
//! - [`ValidationResult`] and [`ValidationState`] for per-field outcomes
//! - [`FormField`] and the [`Passenger`] record
//! - pure field rules ([`validate_email`], [`validate_required`]) and the
//!   case-insensitive [`UsernameRules`] directory rule
//!
//! ## Dependency Rules
//!
//! - Depends only on the `shared` crate
//! - No I/O, no async

pub use checkin_shared::shared_crate_version;

pub mod error;
pub mod field;
pub mod form_state;
pub mod passenger;
pub mod rules;
pub mod validation;

pub use error::DomainError;
pub use field::FormField;
pub use form_state::{FormProblem, ValidationState};
pub use passenger::{Passenger, PassengerId, PassengerSummary};
pub use rules::{
    DEFAULT_TAKEN_MESSAGE, DEFAULT_TAKEN_USERNAMES, UsernameRules, validate_email, validate_field,
    validate_required,
};
pub use validation::ValidationResult;

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
