//! # checkin-config
//!
//! Configuration schema, env overrides, and loading for the check-in forms.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env).
pub mod load;
/// Configuration schema types and validation.
pub mod schema;
/// Passenger storage selection.
pub mod storage;

pub use env::{ALL_ENV_VARS, EnvParseError, FormsEnv, apply_env_overrides};
pub use load::{
    load_forms_config_from_path, load_forms_config_from_sources, load_forms_config_std_env,
    to_pretty_json, to_pretty_toml,
};
pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, DirectoryConfig, FormsConfig, LogConfig,
    LogFormat, RetryConfig, StorageConfig, ValidatedFormsConfig, ValidatorConfig,
    parse_forms_config_json, parse_forms_config_toml,
};
pub use storage::{PassengerStorageMode, StorageKind};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
