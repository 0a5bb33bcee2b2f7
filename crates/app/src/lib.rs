//! # checkin-app
//!
//! Check-in use cases: the form view-model, the debounced username
//! validator, and the passenger listing.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod field_store;
pub mod list_passengers;
pub mod passenger_form;
pub mod start_check_in;
pub mod username_validator;

pub use field_store::FieldResultStore;
pub use list_passengers::{ListPassengersDeps, list_passengers};
pub use passenger_form::{PassengerForm, PassengerFormDeps, describe_result};
pub use start_check_in::{StartCheckInDeps, start_check_in};
pub use username_validator::{
    LOOKUP_FAILED_MESSAGE, UsernameValidator, UsernameValidatorDeps, UsernameValidatorSettings,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
