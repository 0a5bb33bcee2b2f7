//! Bridge from [`LoggerPort`] to the `tracing` ecosystem.

use checkin_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use checkin_shared::redact_for_key;
use serde_json::Value;

/// Forwards events to `tracing` under the `checkin` target. Formatting and
/// filtering are left to whichever subscriber the binary installs.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    base_fields: LogFields,
}

impl TracingLogger {
    /// Logger with no base fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        let fields = render_fields(&self.base_fields, event.fields.as_ref());
        let error = event
            .error
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default();
        let name = &*event.event;
        let message = &*event.message;

        match event.level {
            LogLevel::Debug => {
                tracing::debug!(target: "checkin", event = name, fields = %fields, error = %error, "{message}");
            },
            LogLevel::Info => {
                tracing::info!(target: "checkin", event = name, fields = %fields, error = %error, "{message}");
            },
            LogLevel::Warn => {
                tracing::warn!(target: "checkin", event = name, fields = %fields, error = %error, "{message}");
            },
            LogLevel::Error => {
                tracing::error!(target: "checkin", event = name, fields = %fields, error = %error, "{message}");
            },
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut base_fields = self.base_fields.clone();
        base_fields.extend(fields);
        Box::new(Self { base_fields })
    }
}

/// `key=value` pairs, sensitive values masked.
fn render_fields(base: &LogFields, extra: Option<&LogFields>) -> String {
    base.iter()
        .chain(extra.into_iter().flatten())
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            let rendered = redact_for_key(key, &rendered).unwrap_or(rendered);
            format!("{key}={rendered}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_render_as_masked_pairs() {
        let mut base = LogFields::new();
        base.insert("correlationId".into(), json!("form_3"));
        let mut extra = LogFields::new();
        extra.insert("email".into(), json!("kirk@gate.m72"));
        extra.insert("generation".into(), json!(4));

        let rendered = render_fields(&base, Some(&extra));
        assert_eq!(
            rendered,
            "correlationId=form_3 email=k***@gate.m72 generation=4"
        );
    }

    #[test]
    fn logging_without_a_subscriber_is_a_no_op() {
        let logger = TracingLogger::new();
        let child = logger.child(LogFields::new());
        child.info("form.username.settled", "settled", None);
        child.error("form.passenger.saveFailed", "failed", None);
    }
}
