//! Single-field validation handler.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, ndjson_summary, pretty_json};
use crate::format_error_output;
use checkin_domain::{FormField, ValidationResult, validate_field};
use checkin_shared::{ErrorCode, ErrorEnvelope};

/// Run the validate command.
pub fn run_validate(mode: OutputMode, field: &str, value: &str) -> Result<CliOutput, CliError> {
    let field = match field.parse::<FormField>() {
        Ok(field) => field,
        Err(error) => return Ok(format_error_output(mode, &ErrorEnvelope::from(error))),
    };
    let Some(result) = validate_field(field, value) else {
        let error = ErrorEnvelope::expected(
            ErrorCode::invalid_input(),
            "username is checked against the directory; use `check-username`",
        )
        .with_metadata("field", field.key());
        return Ok(format_error_output(mode, &error));
    };
    format_validate_output(mode, field, &result)
}

fn format_validate_output(
    mode: OutputMode,
    field: FormField,
    result: &ValidationResult,
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        ndjson_summary(
            "ok",
            "validate",
            serde_json::json!({ "field": field, "result": result }),
        )?
    } else if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": "ok",
            "field": field,
            "result": result,
        }))?
    } else {
        format!("{}: {result}\n", field.label())
    };
    Ok(CliOutput::ok(stdout))
}
