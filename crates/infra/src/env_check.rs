//! Environment validation helpers for CLI surfaces.

use checkin_config::{FormsConfig, FormsEnv, apply_env_overrides};
use checkin_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Check that `env` parses and merges cleanly over the default config.
pub fn validate_env_parsing(env: &BTreeMap<String, String>) -> InfraResult<()> {
    let parsed = FormsEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    apply_env_overrides(FormsConfig::default(), &parsed)?;
    Ok(())
}
