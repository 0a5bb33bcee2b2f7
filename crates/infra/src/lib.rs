//! # checkin-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `app`, `adapters`, `config`, and `shared`.

/// Adapter selection from a validated config.
pub mod composition;
/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Environment validation helpers used by CLI surfaces.
pub mod env_check;
/// Form script parsing.
pub mod form_script;
/// Scripted form sessions.
pub mod script_runner;

pub use composition::{
    FormServices, build_logger, build_passenger_store, build_username_lookup, validator_settings,
};
pub use config_check::{ConfigRendering, load_effective_config, render_effective_config};
pub use env_check::{InfraError, InfraResult, validate_env_parsing};
pub use form_script::{FormScript, ScriptParseError, ScriptParseReason, ScriptStep, parse_form_script};
pub use script_runner::{
    CompletionOutcome, FormRunReport, UsernameTransition, list_stored_passengers, run_form_script,
    run_form_script_async,
};

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_adapters::adapters_crate_version;
    use checkin_app::app_crate_version;
    use checkin_config::config_crate_version;
    use checkin_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                continue;
            }
            if in_deps && line.starts_with("checkin-") {
                let key = line.split('=').next().unwrap_or("").trim();
                deps.push(key.split('.').next().unwrap_or("").trim().to_owned());
            }
        }
        deps
    }

    #[test]
    fn infra_depends_on_app_adapters_config() {
        let deps = workspace_deps();
        for expected in ["checkin-app", "checkin-adapters", "checkin-config"] {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
    }

    #[test]
    fn infra_can_use_app_adapters_config_shared() {
        assert!(!infra_crate_version().is_empty());
        assert!(!app_crate_version().is_empty());
        assert!(!adapters_crate_version().is_empty());
        assert!(!config_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
