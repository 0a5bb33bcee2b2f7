//! Versioned configuration schema for the check-in forms.
//!
//! The schema is deserialized from JSON or TOML (camelCase keys, unknown
//! keys rejected, every section optional) and then passed through
//! [`FormsConfig::validate_and_normalize`] before anything reads it.

use crate::storage::{PassengerStorageMode, StorageKind};
use checkin_domain::UsernameRules;
use checkin_domain::rules::{DEFAULT_TAKEN_MESSAGE, DEFAULT_TAKEN_USERNAMES};
use checkin_shared::{ErrorCode, ErrorEnvelope, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Schema version understood by this build.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

const DEBOUNCE_MAX_MS: u64 = 10_000;
const LOOKUP_TIMEOUT_MIN_MS: u64 = 1;
const LOOKUP_TIMEOUT_MAX_MS: u64 = 60_000;
const LOOKUP_DELAY_MAX_MS: u64 = 60_000;
const RETRY_MAX_ATTEMPTS_MIN: u32 = 1;
const RETRY_MAX_ATTEMPTS_MAX: u32 = 10;
const RETRY_DELAY_MAX_MS: u64 = 60_000;
const RETRY_JITTER_MAX_PCT: u32 = 100;
const TAKEN_USERNAMES_MAX: usize = 1_000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FormsConfig {
    /// Schema version.
    pub version: u32,
    /// Username validator timing.
    pub validator: ValidatorConfig,
    /// Simulated username directory.
    pub directory: DirectoryConfig,
    /// Passenger persistence.
    pub storage: StorageConfig,
    /// Log level and format.
    pub log: LogConfig,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            validator: ValidatorConfig::default(),
            directory: DirectoryConfig::default(),
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl FormsConfig {
    /// Validate bounds and normalize lists and names.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedFormsConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        self.validator.validate()?;
        self.directory.normalize_and_validate()?;
        self.storage.normalize_and_validate()?;
        self.log.normalize_and_validate()?;

        Ok(ValidatedFormsConfig { raw: self })
    }
}

/// Config that has passed [`FormsConfig::validate_and_normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFormsConfig {
    raw: FormsConfig,
}

impl ValidatedFormsConfig {
    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &FormsConfig {
        &self.raw
    }

    /// Consume the wrapper.
    #[must_use]
    pub fn into_inner(self) -> FormsConfig {
        self.raw
    }

    /// Quiet period before a username is looked up.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.raw.validator.debounce_ms)
    }

    /// Deadline for a single lookup attempt.
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.raw.validator.lookup_timeout_ms)
    }

    /// Simulated directory round-trip.
    #[must_use]
    pub const fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.raw.directory.lookup_delay_ms)
    }

    /// Retry policy for lookups.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.raw.validator.retry.to_policy()
    }

    /// Taken-username rules for the simulated directory.
    pub fn username_rules(&self) -> Result<UsernameRules, ErrorEnvelope> {
        let directory = &self.raw.directory;
        UsernameRules::new(
            directory.taken_usernames.iter().map(AsRef::as_ref),
            directory.taken_message.clone(),
        )
        .map_err(ErrorEnvelope::from)
    }

    /// Resolved passenger storage.
    #[must_use]
    pub fn storage_mode(&self) -> PassengerStorageMode {
        self.raw.storage.resolve()
    }
}

impl AsRef<FormsConfig> for ValidatedFormsConfig {
    fn as_ref(&self) -> &FormsConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedFormsConfig {
    type Target = FormsConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse and validate a JSON config document.
pub fn parse_forms_config_json(input: &str) -> Result<ValidatedFormsConfig, ErrorEnvelope> {
    let config: FormsConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse and validate a TOML config document.
pub fn parse_forms_config_toml(input: &str) -> Result<ValidatedFormsConfig, ErrorEnvelope> {
    let config: FormsConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Username validator timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ValidatorConfig {
    /// Quiet period after the last keystroke (ms).
    pub debounce_ms: u64,
    /// Per-attempt lookup deadline (ms).
    pub lookup_timeout_ms: u64,
    /// Retry policy for failed lookups.
    pub retry: RetryConfig,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            lookup_timeout_ms: 5_000,
            retry: RetryConfig::default(),
        }
    }
}

impl ValidatorConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        validate_timeout_ms("validator", "debounceMs", self.debounce_ms, 0, DEBOUNCE_MAX_MS)?;
        validate_timeout_ms(
            "validator",
            "lookupTimeoutMs",
            self.lookup_timeout_ms,
            LOOKUP_TIMEOUT_MIN_MS,
            LOOKUP_TIMEOUT_MAX_MS,
        )?;
        self.retry.validate()
    }
}

/// Lookup retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RetryConfig {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Backoff base (ms).
    pub base_delay_ms: u64,
    /// Backoff ceiling (ms).
    pub max_delay_ms: u64,
    /// Jitter as a percentage of the computed delay.
    pub jitter_ratio_pct: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay_ms,
            max_delay_ms: policy.max_delay_ms,
            jitter_ratio_pct: policy.jitter_ratio_pct,
        }
    }
}

impl RetryConfig {
    /// Runtime policy.
    #[must_use]
    pub const fn to_policy(self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            max_delay_ms: self.max_delay_ms,
            jitter_ratio_pct: self.jitter_ratio_pct,
        }
    }

    fn validate(&self) -> Result<(), ConfigSchemaError> {
        validate_limit_u32(
            "validator.retry",
            "maxAttempts",
            self.max_attempts,
            RETRY_MAX_ATTEMPTS_MIN,
            RETRY_MAX_ATTEMPTS_MAX,
        )?;
        validate_timeout_ms(
            "validator.retry",
            "baseDelayMs",
            self.base_delay_ms,
            0,
            RETRY_DELAY_MAX_MS,
        )?;
        validate_timeout_ms(
            "validator.retry",
            "maxDelayMs",
            self.max_delay_ms,
            self.base_delay_ms,
            RETRY_DELAY_MAX_MS,
        )?;
        validate_limit_u32(
            "validator.retry",
            "jitterRatioPct",
            self.jitter_ratio_pct,
            0,
            RETRY_JITTER_MAX_PCT,
        )
    }
}

/// Simulated username directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DirectoryConfig {
    /// Simulated round-trip (ms).
    pub lookup_delay_ms: u64,
    /// Usernames reported as taken. Matched case-insensitively.
    pub taken_usernames: Vec<Box<str>>,
    /// Message attached to a taken username.
    pub taken_message: Box<str>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            lookup_delay_ms: 500,
            taken_usernames: DEFAULT_TAKEN_USERNAMES.iter().map(|name| (*name).into()).collect(),
            taken_message: DEFAULT_TAKEN_MESSAGE.into(),
        }
    }
}

impl DirectoryConfig {
    fn normalize_and_validate(&mut self) -> Result<(), ConfigSchemaError> {
        validate_timeout_ms(
            "directory",
            "lookupDelayMs",
            self.lookup_delay_ms,
            0,
            LOOKUP_DELAY_MAX_MS,
        )?;

        let mut names = Vec::with_capacity(self.taken_usernames.len());
        for (index, raw) in self.taken_usernames.iter().enumerate() {
            let name = raw.trim();
            if name.is_empty() {
                return Err(ConfigSchemaError::EmptyListEntry {
                    section: "directory",
                    field: "takenUsernames",
                    index,
                });
            }
            names.push(name.to_lowercase().into_boxed_str());
        }
        names.sort_unstable();
        names.dedup();
        if names.len() > TAKEN_USERNAMES_MAX {
            return Err(ConfigSchemaError::ListTooLarge {
                section: "directory",
                field: "takenUsernames",
                len: names.len(),
                max: TAKEN_USERNAMES_MAX,
            });
        }
        self.taken_usernames = names;

        let message = self.taken_message.trim();
        if message.is_empty() {
            return Err(ConfigSchemaError::EmptyValue {
                section: "directory",
                field: "takenMessage",
            });
        }
        self.taken_message = message.into();
        Ok(())
    }
}

/// Passenger persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct StorageConfig {
    /// Backend kind.
    pub mode: StorageKind,
    /// Snapshot file; required when `mode` is `file`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Box<str>>,
}

impl StorageConfig {
    fn normalize_and_validate(&mut self) -> Result<(), ConfigSchemaError> {
        self.path = self
            .path
            .take()
            .map(|path| path.trim().to_owned())
            .filter(|path| !path.is_empty())
            .map(String::into_boxed_str);

        if self.mode == StorageKind::File && self.path.is_none() {
            return Err(ConfigSchemaError::EmptyValue {
                section: "storage",
                field: "path",
            });
        }
        Ok(())
    }

    /// Storage backend to build. Only meaningful after validation.
    #[must_use]
    pub fn resolve(&self) -> PassengerStorageMode {
        match (self.mode, self.path.as_deref()) {
            (StorageKind::File, Some(path)) => PassengerStorageMode::File(PathBuf::from(path)),
            _ => PassengerStorageMode::Memory,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LogConfig {
    /// Default filter level when `RUST_LOG` is unset.
    pub level: Box<str>,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    fn normalize_and_validate(&mut self) -> Result<(), ConfigSchemaError> {
        let level = self.level.trim().to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigSchemaError::InvalidLogLevel {
                value: self.level.to_string(),
            });
        }
        self.level = level.into_boxed_str();
        Ok(())
    }
}

/// Schema validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A duration is out of bounds.
    TimeoutOutOfRange {
        /// Schema section (e.g. `validator`).
        section: &'static str,
        /// Field name (e.g. `debounceMs`).
        field: &'static str,
        /// Value provided (ms).
        value_ms: u64,
        /// Minimum allowed value (ms).
        min_ms: u64,
        /// Maximum allowed value (ms).
        max_ms: u64,
    },
    /// A count is out of bounds.
    LimitOutOfRange {
        /// Schema section.
        section: &'static str,
        /// Field name.
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
    /// A list is longer than allowed after deduplication.
    ListTooLarge {
        /// Schema section.
        section: &'static str,
        /// Field name.
        field: &'static str,
        /// Entries after deduplication.
        len: usize,
        /// Maximum allowed entries.
        max: usize,
    },
    /// A list entry was blank.
    EmptyListEntry {
        /// Schema section.
        section: &'static str,
        /// Field name.
        field: &'static str,
        /// Position of the blank entry.
        index: usize,
    },
    /// A required string was blank or missing.
    EmptyValue {
        /// Schema section.
        section: &'static str,
        /// Field name.
        field: &'static str,
    },
    /// `log.level` is not a known level.
    InvalidLogLevel {
        /// Value provided.
        value: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::TimeoutOutOfRange { .. } => ErrorCode::new("config", "invalid_timeout"),
            Self::LimitOutOfRange { .. } => ErrorCode::new("config", "invalid_limit"),
            Self::ListTooLarge { .. } => ErrorCode::new("config", "list_too_large"),
            Self::EmptyListEntry { .. } => ErrorCode::new("config", "empty_list_entry"),
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_value"),
            Self::InvalidLogLevel { .. } => ErrorCode::new("config", "invalid_log_level"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version: {found} (supported: {supported})"
            ),
            Self::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min_ms}, {max_ms}] ms (got {value_ms})"
            ),
            Self::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{section}.{field} must be within [{min}, {max}] (got {value})"
            ),
            Self::ListTooLarge {
                section,
                field,
                len,
                max,
            } => write!(
                formatter,
                "{section}.{field} has too many entries ({len}, max {max})"
            ),
            Self::EmptyListEntry {
                section,
                field,
                index,
            } => write!(formatter, "{section}.{field}[{index}] must be non-empty"),
            Self::EmptyValue { section, field } => {
                write!(formatter, "{section}.{field} must be non-empty")
            },
            Self::InvalidLogLevel { value } => write!(
                formatter,
                "log.level `{value}` is not one of trace, debug, info, warn, error"
            ),
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::TimeoutOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value_ms", value_ms.to_string())
                .with_metadata("min_ms", min_ms.to_string())
                .with_metadata("max_ms", max_ms.to_string()),
            ConfigSchemaError::LimitOutOfRange {
                section,
                field,
                value,
                min,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value", value.to_string())
                .with_metadata("min", min.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::ListTooLarge {
                section,
                field,
                len,
                max,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
            ConfigSchemaError::EmptyListEntry {
                section,
                field,
                index,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("index", index.to_string()),
            ConfigSchemaError::EmptyValue { section, field } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
            ConfigSchemaError::InvalidLogLevel { value } => envelope.with_metadata("value", value),
        }
    }
}

const fn validate_timeout_ms(
    section: &'static str,
    field: &'static str,
    value_ms: u64,
    min_ms: u64,
    max_ms: u64,
) -> Result<(), ConfigSchemaError> {
    if value_ms < min_ms || value_ms > max_ms {
        return Err(ConfigSchemaError::TimeoutOutOfRange {
            section,
            field,
            value_ms,
            min_ms,
            max_ms,
        });
    }
    Ok(())
}

fn validate_limit_u32(
    section: &'static str,
    field: &'static str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), ConfigSchemaError> {
    if value < min || value > max {
        return Err(ConfigSchemaError::LimitOutOfRange {
            section,
            field,
            value: u64::from(value),
            min: u64::from(min),
            max: u64::from(max),
        });
    }
    Ok(())
}
