//! Injectable logging for the accrual engine.
//!
//! The original Python implementation this logic is ported from switches
//! between stdout and a log file via a module-level global (`logging_mode`).
//! We replace that with a logger handle passed into each accrual call, so a
//! caller can choose to print, write to a file, or capture records for
//! assertions in tests without touching global state.

use log::Level;

/// Receives one record per noteworthy event during accrual.
pub trait MintingLogger {
    fn log(&mut self, level: Level, node_id: u32, message: String);
}

/// Forwards records to the `log` facade crate, at the caller's configured
/// level and target. This is the default used outside of tests; the demo CLI
/// wires it up behind `pretty_env_logger`.
#[derive(Debug, Default)]
pub struct FacadeLogger;

impl MintingLogger for FacadeLogger {
    fn log(&mut self, level: Level, node_id: u32, message: String) {
        log::log!(level, "[node {node_id}] {message}");
    }
}

/// A single captured log record, used by [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Level,
    pub node_id: u32,
    pub message: String,
}

/// Captures records in memory instead of emitting them, for tests that want
/// to assert on which violations or notices were raised.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    pub records: Vec<LogRecord>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter().filter(|r| r.level == Level::Warn)
    }
}

impl MintingLogger for RecordingLogger {
    fn log(&mut self, level: Level, node_id: u32, message: String) {
        self.records.push(LogRecord {
            level,
            node_id,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_logger_captures_in_order() {
        let mut logger = RecordingLogger::new();
        logger.log(Level::Debug, 1, "first".to_string());
        logger.log(Level::Warn, 1, "second".to_string());

        assert_eq!(logger.records.len(), 2);
        assert_eq!(logger.records[0].message, "first");
        assert_eq!(logger.warnings().count(), 1);
    }
}
