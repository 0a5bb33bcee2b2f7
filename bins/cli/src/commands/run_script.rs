//! Form script handler.

use super::report::format_report_output;
use crate::CliOutput;
use crate::error::CliError;
use crate::format::OutputMode;
use crate::format_error_output;
use checkin_infra::{FormServices, parse_form_script, run_form_script};
use checkin_shared::ErrorEnvelope;
use std::io::Read;
use std::path::Path;

/// Run a form script read from `path`, or from stdin when `None`.
pub fn run_script(
    mode: OutputMode,
    services: &FormServices,
    path: Option<&Path>,
) -> Result<CliOutput, CliError> {
    let source = match path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                let error = ErrorEnvelope::from(error)
                    .with_metadata("path", path.display().to_string());
                return Ok(format_error_output(mode, &error));
            },
        },
        None => read_stdin()?,
    };

    let script = match parse_form_script(&source) {
        Ok(script) => script,
        Err(error) => return Ok(format_error_output(mode, &ErrorEnvelope::from(error))),
    };
    if script.is_empty() {
        tracing::warn!("form script has no steps");
    }

    match run_form_script(services, &script) {
        Ok(report) => format_report_output(mode, "run", &report),
        Err(error) => Ok(format_error_output(mode, &error)),
    }
}

fn read_stdin() -> Result<String, CliError> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .map_err(|error| CliError::io("failed to read script from stdin", error))?;
    Ok(source)
}
