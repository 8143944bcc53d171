//! Diagnostic sink handed to each pass
//!
//! Passes report what they detect (dialect, layer height, block counts)
//! through a sink owned by the caller instead of a process-wide logger.

use std::cell::RefCell;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

/// Receiver of diagnostic trace messages
pub trait DiagnosticSink {
    /// Record a message at `level`
    fn emit(&self, level: DiagnosticLevel, message: &str);

    fn debug(&self, message: &str) {
        self.emit(DiagnosticLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.emit(DiagnosticLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(DiagnosticLevel::Warn, message);
    }
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, level: DiagnosticLevel, message: &str) {
        match level {
            DiagnosticLevel::Debug => tracing::debug!("{}", message),
            DiagnosticLevel::Info => tracing::info!("{}", message),
            DiagnosticLevel::Warn => tracing::warn!("{}", message),
        }
    }
}

/// Keeps every diagnostic in memory, for inspection after a pass
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: RefCell<Vec<(DiagnosticLevel, String)>>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded messages
    pub fn entries(&self) -> Vec<(DiagnosticLevel, String)> {
        self.entries.borrow().clone()
    }

    /// Messages recorded at warning level
    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(level, _)| *level == DiagnosticLevel::Warn)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|(_, msg)| msg.contains(needle))
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, level: DiagnosticLevel, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_records_levels() {
        let sink = CollectingSink::new();
        sink.debug("dialect probe");
        sink.info("layer height 0.2");
        sink.warn("falling back");

        let entries = sink.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, DiagnosticLevel::Debug);
        assert_eq!(sink.warnings(), vec!["falling back".to_string()]);
        assert!(sink.contains("layer height"));
        assert!(!sink.contains("missing"));
    }
}
