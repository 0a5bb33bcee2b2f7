//! Structured logging boundary.

use checkin_shared::ErrorEnvelope;
use std::collections::BTreeMap;
use std::fmt;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Diagnostic detail (duplicate drops, stale results).
    Debug,
    /// Normal lifecycle events.
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures surfaced to the user or swallowed after logging.
    Error,
}

impl LogLevel {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Structured fields attached to an event.
pub type LogFields = BTreeMap<Box<str>, serde_json::Value>;

/// One structured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Dotted event name, e.g. `form.username.settled`.
    pub event: Box<str>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: Box<str>,
    /// Structured fields.
    pub fields: Option<LogFields>,
    /// Serialized [`ErrorEnvelope`], when the event reports a failure.
    pub error: Option<serde_json::Value>,
}

impl LogEvent {
    /// Event without fields or error.
    pub fn new(level: LogLevel, event: &str, message: &str) -> Self {
        Self {
            event: event.into(),
            level,
            message: message.into(),
            fields: None,
            error: None,
        }
    }

    /// Attach fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Option<LogFields>) -> Self {
        self.fields = fields;
        self
    }

    /// Attach an error envelope.
    #[must_use]
    pub fn with_error(mut self, error: &ErrorEnvelope) -> Self {
        self.error = serde_json::to_value(error).ok();
        self
    }
}

/// Sink for structured events. Implementations must not block.
pub trait LoggerPort: Send + Sync {
    /// Emit one event.
    fn log(&self, event: LogEvent);

    /// Logger that merges `fields` into every event it emits.
    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort>;

    /// Emit a debug event.
    fn debug(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Debug, event, message).with_fields(fields));
    }

    /// Emit an info event.
    fn info(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Info, event, message).with_fields(fields));
    }

    /// Emit a warn event.
    fn warn(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Warn, event, message).with_fields(fields));
    }

    /// Emit an error event.
    fn error(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Error, event, message).with_fields(fields));
    }

    /// Emit an error event carrying `error`.
    fn failure(&self, event: &str, message: &str, error: &ErrorEnvelope, fields: Option<LogFields>) {
        self.log(
            LogEvent::new(LogLevel::Error, event, message)
                .with_fields(fields)
                .with_error(error),
        );
    }
}
