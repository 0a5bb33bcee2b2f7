//! Config check/show handlers.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, ndjson_summary, pretty_json};
use crate::format_error_output;
use checkin_config::{FormsConfig, ValidatedFormsConfig, to_pretty_toml};

/// Validate the effective config and summarize its knobs.
pub fn run_config_check(
    mode: OutputMode,
    config: &ValidatedFormsConfig,
) -> Result<CliOutput, CliError> {
    let storage = config.storage_mode();
    let summary = serde_json::json!({
        "debounceMs": config.validator.debounce_ms,
        "lookupTimeoutMs": config.validator.lookup_timeout_ms,
        "lookupDelayMs": config.directory.lookup_delay_ms,
        "takenUsernames": config.directory.taken_usernames.len(),
        "storage": storage.label(),
    });

    let stdout = if mode.is_ndjson() {
        ndjson_summary("ok", "config.check", serde_json::json!({ "config": summary }))?
    } else if mode.is_json() {
        pretty_json(&serde_json::json!({ "status": "ok", "config": summary }))?
    } else {
        format!(
            "status: ok\nconfig: valid\ndebounce: {}ms\nlookup timeout: {}ms\nlookup delay: {}ms\ntaken usernames: {}\nstorage: {}\n",
            config.validator.debounce_ms,
            config.validator.lookup_timeout_ms,
            config.directory.lookup_delay_ms,
            config.directory.taken_usernames.len(),
            storage.label(),
        )
    };
    Ok(CliOutput::ok(stdout).with_progress(mode, "config check completed"))
}

/// Print the effective config.
pub fn run_config_show(
    mode: OutputMode,
    config: &ValidatedFormsConfig,
) -> Result<CliOutput, CliError> {
    let document: &FormsConfig = config.as_ref();
    let stdout = if mode.is_ndjson() {
        ndjson_summary("ok", "config.show", serde_json::json!({ "config": document }))?
    } else if mode.is_json() {
        pretty_json(&serde_json::json!({ "status": "ok", "config": document }))?
    } else {
        match to_pretty_toml(document) {
            Ok(toml) => toml,
            Err(error) => return Ok(format_error_output(mode, &error)),
        }
    };
    Ok(CliOutput::ok(stdout))
}
