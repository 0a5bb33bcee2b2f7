//! # checkin-adapters
//!
//! Port implementations: the simulated username directory, passenger
//! stores, and the JSON and `tracing` loggers.
//! Depends on `ports`, `domain`, and `shared`; never on `app` or `infra`.

pub mod log_sink;
pub mod logger;
pub mod passenger_store;
pub mod tracing_logger;
pub mod username_directory;

pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;
pub use passenger_store::{InMemoryPassengerStore, JsonFilePassengerStore};
pub use tracing_logger::TracingLogger;
pub use username_directory::{DEFAULT_LOOKUP_DELAY, SimulatedUsernameDirectory};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapters_do_not_depend_on_app_or_infra() {
        let manifest = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        for forbidden in ["checkin-app", "checkin-infra"] {
            assert!(
                !manifest.lines().any(|line| line.trim_start().starts_with(forbidden)),
                "forbidden dependency found: {forbidden}"
            );
        }
    }

    #[test]
    fn adapters_crate_compiles() {
        assert!(!adapters_crate_version().is_empty());
    }
}
