//! Username burst handler.

use super::report::format_report_output;
use crate::CliOutput;
use crate::error::CliError;
use crate::format::OutputMode;
use crate::format_error_output;
use checkin_infra::{FormScript, FormServices, run_form_script};
use std::time::Duration;

/// Type `values` into the username field `gap_ms` apart and report every
/// result the field showed.
pub fn run_check_username(
    mode: OutputMode,
    services: &FormServices,
    values: &[String],
    gap_ms: u64,
) -> Result<CliOutput, CliError> {
    tracing::debug!(values = values.len(), gap_ms, "checking username burst");
    let script = FormScript::username_burst(values.iter().cloned(), Duration::from_millis(gap_ms));
    match run_form_script(services, &script) {
        Ok(report) => format_report_output(mode, "check-username", &report),
        Err(error) => Ok(format_error_output(mode, &error)),
    }
}
