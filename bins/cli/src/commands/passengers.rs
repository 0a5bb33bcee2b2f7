//! Stored passenger listing.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, ndjson_line, ndjson_summary, pretty_json};
use crate::format_error_output;
use checkin_domain::PassengerSummary;
use checkin_infra::{FormServices, list_stored_passengers};

/// Run `passengers list`.
pub fn run_passengers_list(
    mode: OutputMode,
    services: &FormServices,
) -> Result<CliOutput, CliError> {
    match list_stored_passengers(services) {
        Ok(passengers) => format_passengers_output(mode, &passengers),
        Err(error) => Ok(format_error_output(mode, &error)),
    }
}

fn format_passengers_output(
    mode: OutputMode,
    passengers: &[PassengerSummary],
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        let mut out = String::new();
        for passenger in passengers {
            out.push_str(&ndjson_line(&serde_json::json!({
                "type": "passenger",
                "passenger": passenger,
            }))?);
        }
        out.push_str(&ndjson_summary(
            "ok",
            "passengers.list",
            serde_json::json!({ "count": passengers.len() }),
        )?);
        out
    } else if mode.is_json() {
        pretty_json(&serde_json::json!({ "status": "ok", "passengers": passengers }))?
    } else {
        format_passengers_text(passengers)
    };
    Ok(CliOutput::ok(stdout))
}

fn format_passengers_text(passengers: &[PassengerSummary]) -> String {
    if passengers.is_empty() {
        return "no passengers\n".to_owned();
    }
    let mut out = String::new();
    for passenger in passengers {
        out.push_str(passenger.id.as_str());
        out.push_str("  ");
        out.push_str(&passenger.display_name);
        if let Some(email) = &passenger.email {
            out.push_str(" <");
            out.push_str(email);
            out.push('>');
        }
        out.push('\n');
    }
    out
}
