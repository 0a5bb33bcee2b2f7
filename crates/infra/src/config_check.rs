//! Config loading helpers for CLI surfaces.

use crate::InfraResult;
use checkin_config::{
    FormsEnv, ValidatedFormsConfig, load_forms_config_from_path, to_pretty_json, to_pretty_toml,
};
use checkin_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::path::Path;

/// Rendering of the effective config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigRendering {
    /// Pretty JSON.
    Json,
    /// TOML.
    Toml,
}

/// Load and validate the effective config from an optional file and `env`.
pub fn load_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
) -> InfraResult<ValidatedFormsConfig> {
    let env = FormsEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_forms_config_from_path(config_path, &env)
}

/// Load the effective config and render it deterministically.
pub fn render_effective_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    rendering: ConfigRendering,
) -> InfraResult<String> {
    let config = load_effective_config(env, config_path)?;
    match rendering {
        ConfigRendering::Json => to_pretty_json(config.as_ref()),
        ConfigRendering::Toml => to_pretty_toml(config.as_ref()),
    }
}
