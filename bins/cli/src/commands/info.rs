//! Info command handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, ndjson_summary, pretty_json};
use checkin_config::CURRENT_CONFIG_VERSION;
use checkin_infra::infra_crate_version;

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let build = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "infraVersion": infra_crate_version(),
        "configVersion": CURRENT_CONFIG_VERSION,
    });

    let stdout = if mode.is_ndjson() {
        ndjson_summary("ok", "info", serde_json::json!({ "build": build }))?
    } else if mode.is_json() {
        pretty_json(&serde_json::json!({ "status": "ok", "build": build }))?
    } else {
        format!(
            "status: ok\nname: {}\nversion: {}\ninfra: {}\nconfig schema: v{}\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            infra_crate_version(),
            CURRENT_CONFIG_VERSION,
        )
    };
    Ok(CliOutput::ok(stdout))
}
