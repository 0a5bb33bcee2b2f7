//! Line-oriented destinations for formatted log events.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Receives one pre-formatted, newline-terminated line per event.
pub trait LogSink: Send + Sync {
    /// Write one line.
    fn write_line(&self, line: &str);
}

/// Writes lines to stderr, leaving stdout for command output.
#[derive(Debug, Default)]
pub struct StderrLogSink;

impl LogSink for StderrLogSink {
    fn write_line(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        // A failed log write has nowhere better to go.
        let _ = stderr.write_all(line.as_bytes());
    }
}

/// Keeps lines in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain captured lines.
    pub fn take(&self) -> Vec<String> {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *lines)
    }
}

impl LogSink for MemoryLogSink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_drains_in_order() {
        let sink = MemoryLogSink::new();
        sink.write_line("boarding\n");
        sink.write_line("seated\n");
        assert_eq!(sink.take(), vec!["boarding\n", "seated\n"]);
        assert!(sink.take().is_empty());
    }
}
