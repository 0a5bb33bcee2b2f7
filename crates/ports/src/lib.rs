//! # checkin-ports
//!
//! Port traits between the check-in application layer and its adapters.
//! Depends only on `domain` and `shared`.

use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by port methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod logger;
pub mod passenger_store;
pub mod username;

pub use logger::*;
pub use passenger_store::*;
pub use username::*;

// Domain types used in port signatures, so adapters need not depend on
// `checkin-domain` directly.
pub use checkin_domain::{Passenger, PassengerId, ValidationResult};
