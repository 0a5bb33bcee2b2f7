//! Adapter selection for a validated config.

use crate::InfraResult;
use checkin_adapters::{
    InMemoryPassengerStore, JsonFilePassengerStore, JsonLogger, SimulatedUsernameDirectory,
    StderrLogSink, TracingLogger,
};
use checkin_app::{PassengerFormDeps, UsernameValidatorSettings};
use checkin_config::{LogFormat, PassengerStorageMode, ValidatedFormsConfig};
use checkin_ports::{LogLevel, LoggerPort, PassengerStorePort, UsernameLookupPort};
use std::sync::Arc;

/// Everything a form session needs, built once per process.
#[derive(Clone)]
pub struct FormServices {
    /// Username directory.
    pub lookup: Arc<dyn UsernameLookupPort>,
    /// Passenger persistence.
    pub store: Arc<dyn PassengerStorePort>,
    /// Logger, if logging is wanted.
    pub logger: Option<Arc<dyn LoggerPort>>,
    /// Validator timing.
    pub settings: UsernameValidatorSettings,
}

impl FormServices {
    /// Build every adapter from `config`.
    pub fn from_config(config: &ValidatedFormsConfig) -> InfraResult<Self> {
        Ok(Self {
            lookup: build_username_lookup(config)?,
            store: build_passenger_store(config),
            logger: Some(build_logger(config)),
            settings: validator_settings(config),
        })
    }

    /// Same services with logging disabled.
    #[must_use]
    pub fn without_logger(mut self) -> Self {
        self.logger = None;
        self
    }

    /// Dependencies for one [`checkin_app::PassengerForm`].
    #[must_use]
    pub fn form_deps(&self) -> PassengerFormDeps {
        PassengerFormDeps {
            lookup: Arc::clone(&self.lookup),
            store: Arc::clone(&self.store),
            logger: self.logger.clone(),
        }
    }
}

/// Simulated directory using the configured taken set and delay.
pub fn build_username_lookup(
    config: &ValidatedFormsConfig,
) -> InfraResult<Arc<dyn UsernameLookupPort>> {
    let rules = config.username_rules()?;
    Ok(Arc::new(SimulatedUsernameDirectory::new(
        rules,
        config.lookup_delay(),
    )))
}

/// In-memory or JSON-file store, per the storage section.
pub fn build_passenger_store(config: &ValidatedFormsConfig) -> Arc<dyn PassengerStorePort> {
    match config.storage_mode() {
        PassengerStorageMode::Memory => Arc::new(InMemoryPassengerStore::new()),
        PassengerStorageMode::File(path) => Arc::new(JsonFilePassengerStore::new(path)),
    }
}

/// JSON lines on stderr for `json`; `tracing` events for `text`, formatted
/// by whichever subscriber the binary installed.
pub fn build_logger(config: &ValidatedFormsConfig) -> Arc<dyn LoggerPort> {
    match config.log.format {
        LogFormat::Json => Arc::new(
            JsonLogger::new(Arc::new(StderrLogSink))
                .with_min_level(min_log_level(&config.log.level)),
        ),
        LogFormat::Text => Arc::new(TracingLogger::new()),
    }
}

/// Debounce, per-attempt timeout and retry policy.
pub fn validator_settings(config: &ValidatedFormsConfig) -> UsernameValidatorSettings {
    UsernameValidatorSettings {
        debounce: config.debounce(),
        lookup_timeout: config.lookup_timeout(),
        retry: config.retry_policy(),
    }
}

fn min_log_level(level: &str) -> LogLevel {
    match level {
        "trace" | "debug" => LogLevel::Debug,
        "warn" => LogLevel::Warn,
        "error" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_config::FormsConfig;
    use checkin_shared::{RequestContext, Result};
    use std::time::Duration;

    fn validated(config: FormsConfig) -> Result<ValidatedFormsConfig> {
        config
            .validate_and_normalize()
            .map_err(checkin_shared::ErrorEnvelope::from)
    }

    #[test]
    fn settings_follow_the_validator_section() -> Result<()> {
        let mut config = FormsConfig::default();
        config.validator.debounce_ms = 250;
        let settings = validator_settings(&validated(config)?);
        assert_eq!(settings.debounce, Duration::from_millis(250));
        assert_eq!(settings.lookup_timeout, Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn log_levels_collapse_onto_port_levels() {
        assert_eq!(min_log_level("trace"), LogLevel::Debug);
        assert_eq!(min_log_level("info"), LogLevel::Info);
        assert_eq!(min_log_level("error"), LogLevel::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_uses_the_configured_taken_set() -> Result<()> {
        let mut config = FormsConfig::default();
        config.directory.taken_usernames = vec!["Dave".into()];
        let lookup = build_username_lookup(&validated(config)?)?;
        let ctx = RequestContext::new_request();

        let dave = lookup.check_username(&ctx, "DAVE".into()).await?;
        let lars = lookup.check_username(&ctx, "lars".into()).await?;
        assert!(!dave.into_validation().is_valid());
        assert!(lars.into_validation().is_valid());
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_is_the_default() -> Result<()> {
        let store = build_passenger_store(&validated(FormsConfig::default())?);
        let ctx = RequestContext::new_request();
        assert!(store.list(&ctx).await?.is_empty());
        Ok(())
    }
}
