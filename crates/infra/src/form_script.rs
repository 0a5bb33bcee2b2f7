//! Plain-text scripts that drive a check-in form.
//!
//! One step per line:
//!
//! ```text
//! # comment
//! fullName=Cliff Burton
//! username=lars
//! wait 900
//! complete
//! ```
//!
//! Values keep inner whitespace; only the line's trailing newline and the
//! whitespace around the field name are stripped. `field=` sets an empty
//! value.

use checkin_domain::FormField;
use checkin_shared::{ErrorCode, ErrorEnvelope};
use std::fmt;
use std::time::Duration;

/// Longest single `wait` accepted.
pub const MAX_WAIT_MS: u64 = 600_000;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Type `value` into `field`.
    Edit {
        /// Target field.
        field: FormField,
        /// New field content.
        value: String,
    },
    /// Let time pass.
    Wait(Duration),
    /// Press "Complete Check-in".
    Complete,
}

/// Parsed script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormScript {
    steps: Vec<ScriptStep>,
}

impl FormScript {
    /// Script from already-built steps.
    #[must_use]
    pub const fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    /// Username keystrokes separated by `gap`.
    #[must_use]
    pub fn username_burst<I, S>(values: I, gap: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut steps = Vec::new();
        for value in values {
            if !steps.is_empty() && !gap.is_zero() {
                steps.push(ScriptStep::Wait(gap));
            }
            steps.push(ScriptStep::Edit {
                field: FormField::Username,
                value: value.into(),
            });
        }
        Self { steps }
    }

    /// Steps in order.
    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// True when the script has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Script line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptParseError {
    /// 1-based line number.
    pub line: usize,
    /// What was wrong.
    pub reason: ScriptParseReason,
}

/// Why a script line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptParseReason {
    /// Neither `field=value`, `wait <ms>` nor `complete`.
    UnknownStep(String),
    /// Field name not recognized.
    UnknownField(String),
    /// `wait` argument missing, not a number, or too large.
    InvalidWait(String),
}

impl fmt::Display for ScriptParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ScriptParseReason::UnknownStep(text) => {
                write!(formatter, "line {}: unrecognized step `{text}`", self.line)
            },
            ScriptParseReason::UnknownField(name) => {
                write!(formatter, "line {}: unknown field `{name}`", self.line)
            },
            ScriptParseReason::InvalidWait(arg) => write!(
                formatter,
                "line {}: wait expects milliseconds up to {MAX_WAIT_MS}, got `{arg}`",
                self.line
            ),
        }
    }
}

impl std::error::Error for ScriptParseError {}

impl From<ScriptParseError> for ErrorEnvelope {
    fn from(error: ScriptParseError) -> Self {
        let code = match &error.reason {
            ScriptParseReason::UnknownStep(_) => "unknown_step",
            ScriptParseReason::UnknownField(_) => "unknown_field",
            ScriptParseReason::InvalidWait(_) => "invalid_wait",
        };
        Self::expected(ErrorCode::new("script", code), error.to_string())
            .with_metadata("line", error.line.to_string())
    }
}

/// Parse script text.
pub fn parse_form_script(input: &str) -> Result<FormScript, ScriptParseError> {
    let mut steps = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        steps.push(parse_step(raw, trimmed, line)?);
    }
    Ok(FormScript { steps })
}

fn parse_step(raw: &str, trimmed: &str, line: usize) -> Result<ScriptStep, ScriptParseError> {
    let reject = |reason| ScriptParseError { line, reason };

    if let Some((name, value)) = raw.split_once('=') {
        let field = name
            .trim()
            .parse::<FormField>()
            .map_err(|_| reject(ScriptParseReason::UnknownField(name.trim().to_owned())))?;
        return Ok(ScriptStep::Edit {
            field,
            value: value.trim_end_matches(['\r', '\n']).to_owned(),
        });
    }

    if trimmed.eq_ignore_ascii_case("complete") {
        return Ok(ScriptStep::Complete);
    }

    let mut words = trimmed.split_whitespace();
    if words.next().is_some_and(|word| word.eq_ignore_ascii_case("wait")) {
        let arg = words.collect::<Vec<_>>().join(" ");
        let millis = arg
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms <= MAX_WAIT_MS)
            .ok_or_else(|| reject(ScriptParseReason::InvalidWait(arg.clone())))?;
        return Ok(ScriptStep::Wait(Duration::from_millis(millis)));
    }

    Err(reject(ScriptParseReason::UnknownStep(trimmed.to_owned())))
}
