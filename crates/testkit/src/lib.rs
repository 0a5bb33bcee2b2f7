//! # checkin-testkit
//!
//! Test doubles for the check-in ports, plus error fixtures.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod errors;
pub mod logging;
pub mod lookup;
pub mod store;

pub use logging::{NoopLogger, RecordingLogger};
pub use lookup::{CountingUsernameLookup, FailingUsernameLookup, StalledUsernameLookup};
pub use store::FailingPassengerStore;

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_ports::ports_crate_version;
    use checkin_shared::shared_crate_version;

    #[test]
    fn testkit_crate_compiles() {
        assert!(!testkit_crate_version().is_empty());
    }

    #[test]
    fn testkit_can_use_ports_and_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
