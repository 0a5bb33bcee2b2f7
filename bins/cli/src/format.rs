//! Output format helpers for CLI commands.

use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    Text,
    /// Machine-friendly JSON output.
    Json,
    /// Line-delimited JSON (NDJSON) output.
    Ndjson,
}

/// Output-related CLI flags.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
    /// Machine-friendly defaults: NDJSON output and no progress lines.
    #[arg(long, global = true)]
    pub agent: bool,
    /// Suppress progress lines and lower log verbosity to warnings.
    #[arg(long, global = true)]
    pub no_progress: bool,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
    pub no_progress: bool,
}

impl OutputMode {
    /// Build output mode from CLI flags.
    #[must_use]
    pub const fn from_args(args: &OutputArgs) -> Self {
        let format = match (args.output, args.agent) {
            (Some(value), _) => value,
            (None, true) => OutputFormat::Ndjson,
            (None, false) => OutputFormat::Text,
        };
        Self {
            format,
            no_progress: args.no_progress || args.agent,
        }
    }

    /// Returns true when JSON output is requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Returns true when NDJSON output is requested.
    #[must_use]
    pub const fn is_ndjson(self) -> bool {
        matches!(self.format, OutputFormat::Ndjson)
    }
}

/// Pretty JSON document with a trailing newline.
pub fn pretty_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(payload)?;
    out.push('\n');
    Ok(out)
}

/// One NDJSON record with a trailing newline.
pub fn ndjson_line<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string(payload)?;
    out.push('\n');
    Ok(out)
}

/// `{"type":"summary","status":..,"kind":..}` merged with the members of `extra`.
pub fn ndjson_summary(status: &str, kind: &str, extra: Value) -> Result<String, serde_json::Error> {
    let mut payload = Map::new();
    payload.insert("type".into(), Value::from("summary"));
    payload.insert("status".into(), Value::from(status));
    payload.insert("kind".into(), Value::from(kind));
    if let Value::Object(map) = extra {
        payload.extend(map);
    }
    ndjson_line(&Value::Object(payload))
}
