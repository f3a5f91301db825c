//! Stage logger: prefix-scoped, leveled, sink-agnostic
//!
//! Every stage owns one `StageLogger`. Lines are routed to a [`LogSink`];
//! the default sink forwards to `tracing`, while [`MemorySink`] keeps lines
//! around for assertions and post-run diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub line: String,
}

/// Destination for formatted log lines.
pub trait LogSink: Send + Sync {
    fn write(&self, level: LogLevel, line: &str);
}

/// Forwards lines to the active `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", line),
            LogLevel::Info => tracing::info!("{}", line),
            LogLevel::Success => tracing::info!(outcome = "success", "{}", line),
            LogLevel::Error => tracing::error!("{}", line),
        }
    }
}

/// Keeps every line in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.line).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.records().iter().any(|r| r.line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn write(&self, level: LogLevel, line: &str) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(LogRecord {
                level,
                line: line.to_string(),
            });
    }
}

#[derive(Clone)]
pub struct StageLogger {
    prefix: String,
    is_debug: bool,
    sink: Arc<dyn LogSink>,
}

impl StageLogger {
    /// Logger writing to `tracing`, e.g. `StageLogger::new("[stage-1] ", false)`.
    pub fn new(prefix: impl Into<String>, is_debug: bool) -> Self {
        Self::with_sink(prefix, is_debug, Arc::new(TracingSink))
    }

    pub fn with_sink(prefix: impl Into<String>, is_debug: bool, sink: Arc<dyn LogSink>) -> Self {
        Self {
            prefix: prefix.into(),
            is_debug,
            sink,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_debug(&self) -> bool {
        self.is_debug
    }

    /// Dropped unless the logger was built in debug mode.
    pub fn debug(&self, message: impl fmt::Display) {
        if self.is_debug {
            self.emit(LogLevel::Debug, message);
        }
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Info, message);
    }

    pub fn success(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Success, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(LogLevel::Error, message);
    }

    fn emit(&self, level: LogLevel, message: impl fmt::Display) {
        let line = format!("{}{}", self.prefix, message);
        self.sink.write(level, &line);
    }
}

impl fmt::Debug for StageLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageLogger")
            .field("prefix", &self.prefix)
            .field("is_debug", &self.is_debug)
            .finish_non_exhaustive()
    }
}
