//! Loggers for assertions.

use checkin_ports::{LogEvent, LogFields, LoggerPort};
use std::sync::{Arc, Mutex, PoisonError};

/// Discards everything.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self)
    }
}

/// Keeps every event, including those from children, in emission order.
///
/// Child fields are merged into the recorded event so tests can assert on
/// what an adapter would have written.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<LogEvent>>>,
    base_fields: LogFields,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events().iter().map(|event| event.event.to_string()).collect()
    }

    /// Number of events named `event`.
    pub fn count(&self, event: &str) -> usize {
        self.events()
            .iter()
            .filter(|recorded| &*recorded.event == event)
            .count()
    }

    /// First event named `event`.
    pub fn find(&self, event: &str) -> Option<LogEvent> {
        self.events()
            .into_iter()
            .find(|recorded| &*recorded.event == event)
    }
}

impl LoggerPort for RecordingLogger {
    fn log(&self, mut event: LogEvent) {
        if !self.base_fields.is_empty() {
            let mut merged = self.base_fields.clone();
            merged.extend(event.fields.take().unwrap_or_default());
            event.fields = Some(merged);
        }
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut base_fields = self.base_fields.clone();
        base_fields.extend(fields);
        Box::new(Self {
            events: Arc::clone(&self.events),
            base_fields,
        })
    }
}
