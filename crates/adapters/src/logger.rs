//! JSON-lines logger.

use crate::log_sink::LogSink;
use checkin_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use checkin_shared::redact_for_key;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes each event as one JSON object per line.
///
/// Values under sensitive keys (emails, tokens, passwords) are masked at any
/// depth of `fields` and `error` before the line is formatted.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Logger at `info` level writing to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Fields merged into every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Drop events below `level`.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn render(&self, event: LogEvent) -> String {
        let mut fields = Map::new();
        for (key, value) in self.base_fields.iter().chain(event.fields.iter().flatten()) {
            fields.insert(key.to_string(), value.clone());
        }
        let mut fields = Value::Object(fields);
        mask_sensitive(&mut fields);

        let mut payload = Map::new();
        payload.insert("timestampMs".into(), Value::from(now_epoch_ms()));
        payload.insert("level".into(), Value::from(event.level.as_str()));
        payload.insert("event".into(), Value::from(&*event.event));
        payload.insert("message".into(), Value::from(&*event.message));
        if fields.as_object().is_some_and(|map| !map.is_empty()) {
            payload.insert("fields".into(), fields);
        }
        if let Some(mut error) = event.error {
            mask_sensitive(&mut error);
            payload.insert("error".into(), error);
        }

        match serde_json::to_string(&Value::Object(payload)) {
            Ok(mut line) => {
                line.push('\n');
                line
            },
            Err(_) => "{\"level\":\"error\",\"event\":\"logger.serializeFailed\"}\n".to_owned(),
        }
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }
        let line = self.render(event);
        self.sink.write_line(&line);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(self.clone().with_base_fields(merged))
    }
}

fn mask_sensitive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                let masked = match &*nested {
                    Value::String(text) => redact_for_key(key, text),
                    Value::Null => None,
                    other => redact_for_key(key, &other.to_string()),
                };
                match masked {
                    Some(masked) => *nested = Value::String(masked),
                    None => mask_sensitive(nested),
                }
            }
        },
        Value::Array(items) => items.iter_mut().for_each(mask_sensitive),
        _ => {},
    }
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
        .unwrap_or_default()
}
