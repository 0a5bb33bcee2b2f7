//! Shared rendering for scripted form runs.

use crate::CliOutput;
use crate::error::CliError;
use crate::format::{OutputMode, ndjson_line, ndjson_summary, pretty_json};
use checkin_domain::FormField;
use checkin_infra::{CompletionOutcome, FormRunReport};

pub(super) fn format_report_output(
    mode: OutputMode,
    kind: &str,
    report: &FormRunReport,
) -> Result<CliOutput, CliError> {
    let stdout = if mode.is_ndjson() {
        format_report_ndjson(kind, report)?
    } else if mode.is_json() {
        pretty_json(&serde_json::json!({ "status": "ok", "report": report }))?
    } else {
        format_report_text(report)
    };
    let progress = format!("{kind} finished in {}ms", report.elapsed_ms);
    Ok(CliOutput::ok(stdout).with_progress(mode, &progress))
}

fn format_report_ndjson(kind: &str, report: &FormRunReport) -> Result<String, CliError> {
    let mut out = String::new();
    for transition in &report.transitions {
        out.push_str(&ndjson_line(&serde_json::json!({
            "type": "username",
            "elapsedMs": transition.elapsed_ms,
            "result": transition.result,
        }))?);
    }
    out.push_str(&ndjson_summary(
        "ok",
        kind,
        serde_json::json!({
            "passenger": report.passenger,
            "state": report.state,
            "formValid": report.form_valid,
            "completions": report.completions,
            "elapsedMs": report.elapsed_ms,
        }),
    )?);
    Ok(out)
}

fn format_report_text(report: &FormRunReport) -> String {
    let mut out = String::new();
    out.push_str("passenger: ");
    out.push_str(report.passenger.id.as_str());
    out.push('\n');

    out.push_str("username:\n");
    if report.transitions.is_empty() {
        out.push_str("  (no checks)\n");
    }
    for transition in &report.transitions {
        out.push_str(&format!(
            "  +{}ms {}\n",
            transition.elapsed_ms, transition.result
        ));
    }

    out.push_str("fields:\n");
    for field in FormField::ALL {
        let shown = report
            .state
            .get(field)
            .map_or_else(|| "-".to_owned(), ToString::to_string);
        out.push_str(&format!("  {}: {shown}\n", field.label()));
    }
    out.push_str(&format!("formValid: {}\n", report.form_valid));

    for (index, outcome) in report.completions.iter().enumerate() {
        let number = index + 1;
        match outcome {
            CompletionOutcome::CheckedIn => {
                out.push_str(&format!("complete #{number}: checked in\n"));
            },
            CompletionOutcome::Rejected { code, message } => {
                out.push_str(&format!("complete #{number}: rejected ({code}) {message}\n"));
            },
        }
    }
    out.push_str(&format!("elapsedMs: {}\n", report.elapsed_ms));
    out
}
