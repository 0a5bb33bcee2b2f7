//! `CHECKIN_*` environment overrides.
//!
//! Parsing is strict: a variable that is set but blank or malformed is an
//! error rather than silently ignored.

use crate::schema::{FormsConfig, LogFormat, ValidatedFormsConfig};
use crate::storage::StorageKind;
use checkin_shared::{ErrorCode, ErrorEnvelope, redact_for_key};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: debounce window in milliseconds.
pub const ENV_DEBOUNCE_MS: &str = "CHECKIN_DEBOUNCE_MS";
/// Env var: simulated directory round-trip in milliseconds.
pub const ENV_LOOKUP_DELAY_MS: &str = "CHECKIN_LOOKUP_DELAY_MS";
/// Env var: per-attempt lookup deadline in milliseconds.
pub const ENV_LOOKUP_TIMEOUT_MS: &str = "CHECKIN_LOOKUP_TIMEOUT_MS";
/// Env var: lookup attempts including the first.
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "CHECKIN_RETRY_MAX_ATTEMPTS";
/// Env var: comma-separated taken usernames (replaces the configured list).
pub const ENV_TAKEN_USERNAMES: &str = "CHECKIN_TAKEN_USERNAMES";
/// Env var: passenger snapshot path; switches storage to `file`.
pub const ENV_STORAGE_PATH: &str = "CHECKIN_STORAGE_PATH";
/// Env var: default log level.
pub const ENV_LOG_LEVEL: &str = "CHECKIN_LOG_LEVEL";
/// Env var: log format (`text` or `json`).
pub const ENV_LOG_FORMAT: &str = "CHECKIN_LOG_FORMAT";

/// Every variable read by [`FormsEnv::from_std_env`].
pub const ALL_ENV_VARS: [&str; 8] = [
    ENV_DEBOUNCE_MS,
    ENV_LOOKUP_DELAY_MS,
    ENV_LOOKUP_TIMEOUT_MS,
    ENV_RETRY_MAX_ATTEMPTS,
    ENV_TAKEN_USERNAMES,
    ENV_STORAGE_PATH,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
];

const MAX_CSV_ITEMS: usize = 1_000;

/// Typed overrides read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormsEnv {
    /// Override for `validator.debounceMs`.
    pub debounce_ms: Option<u64>,
    /// Override for `directory.lookupDelayMs`.
    pub lookup_delay_ms: Option<u64>,
    /// Override for `validator.lookupTimeoutMs`.
    pub lookup_timeout_ms: Option<u64>,
    /// Override for `validator.retry.maxAttempts`.
    pub retry_max_attempts: Option<u32>,
    /// Override for `directory.takenUsernames`.
    pub taken_usernames: Option<Vec<Box<str>>>,
    /// Override for `storage.path` (implies `storage.mode = file`).
    pub storage_path: Option<Box<str>>,
    /// Override for `log.level`.
    pub log_level: Option<Box<str>>,
    /// Override for `log.format`.
    pub log_format: Option<LogFormat>,
}

impl FormsEnv {
    /// Parse overrides from an explicit map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            debounce_ms: parse_optional_u64(map, ENV_DEBOUNCE_MS)?,
            lookup_delay_ms: parse_optional_u64(map, ENV_LOOKUP_DELAY_MS)?,
            lookup_timeout_ms: parse_optional_u64(map, ENV_LOOKUP_TIMEOUT_MS)?,
            retry_max_attempts: parse_optional_u32(map, ENV_RETRY_MAX_ATTEMPTS)?,
            taken_usernames: parse_optional_csv(map, ENV_TAKEN_USERNAMES)?,
            storage_path: parse_optional_trimmed_string(map, ENV_STORAGE_PATH)?,
            log_level: parse_optional_trimmed_string(map, ENV_LOG_LEVEL)?,
            log_format: parse_optional_log_format(map, ENV_LOG_FORMAT)?,
        })
    }

    /// Parse overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_owned(), value);
            }
        }
        Self::from_map(&map)
    }

    /// True when no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Apply `env` on top of `base`, then validate.
pub fn apply_env_overrides(
    base: FormsConfig,
    env: &FormsEnv,
) -> Result<ValidatedFormsConfig, ErrorEnvelope> {
    let mut config = base;

    if let Some(value) = env.debounce_ms {
        config.validator.debounce_ms = value;
    }
    if let Some(value) = env.lookup_timeout_ms {
        config.validator.lookup_timeout_ms = value;
    }
    if let Some(value) = env.retry_max_attempts {
        config.validator.retry.max_attempts = value;
    }
    if let Some(value) = env.lookup_delay_ms {
        config.directory.lookup_delay_ms = value;
    }
    if let Some(names) = env.taken_usernames.as_ref() {
        config.directory.taken_usernames.clone_from(names);
    }
    if let Some(path) = env.storage_path.as_ref() {
        config.storage.mode = StorageKind::File;
        config.storage.path = Some(path.clone());
    }
    if let Some(level) = env.log_level.as_ref() {
        config.log.level.clone_from(level);
    }
    if let Some(format) = env.log_format {
        config.log.format = format;
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Environment parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// Set but blank after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Not an unsigned integer.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input.
        value: String,
    },
    /// Not one of the accepted names.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input.
        value: String,
    },
    /// CSV list exceeds the safety limit.
    CsvTooLarge {
        /// Env var name.
        var: &'static str,
        /// Items found.
        len: usize,
        /// Items allowed.
        max: usize,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
            Self::CsvTooLarge { .. } => ErrorCode::new("config", "env_csv_too_large"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidInt { var, .. } => {
                write!(formatter, "{var} must be a non-negative integer")
            },
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
            Self::CsvTooLarge { var, len, max } => {
                write!(formatter, "{var} is too large ({len} items, max {max})")
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidInt { var, value } | EnvParseError::InvalidEnum { var, value } => {
                let shown = redact_for_key(var, &value).unwrap_or(value);
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", shown)
            },
            EnvParseError::CsvTooLarge { var, len, max } => envelope
                .with_metadata("env_var", var)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Box<str>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(trimmed.into()))
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: trimmed.into(),
        })
}

fn parse_optional_u32(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: trimmed.into(),
        })
}

fn parse_optional_log_format(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<LogFormat>, EnvParseError> {
    let Some(trimmed) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };
    match trimmed.to_ascii_lowercase().as_str() {
        "text" => Ok(Some(LogFormat::Text)),
        "json" => Ok(Some(LogFormat::Json)),
        _ => Err(EnvParseError::InvalidEnum {
            var,
            value: trimmed.into(),
        }),
    }
}

fn parse_optional_csv(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Vec<Box<str>>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let items: Vec<Box<str>> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Box::from)
        .collect();
    if items.len() > MAX_CSV_ITEMS {
        return Err(EnvParseError::CsvTooLarge {
            var,
            len: items.len(),
            max: MAX_CSV_ITEMS,
        });
    }
    Ok(Some(items))
}
