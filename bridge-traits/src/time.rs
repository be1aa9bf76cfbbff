//! Time and Logging Abstractions
//!
//! Provides injectable time source and logging sink for testing and platform
//! integration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Time source trait
///
/// Abstracts system time to enable deterministic testing and support for
/// host-specified timezones.
pub trait Clock: Send + Sync {
    /// Get current UTC time
    fn now(&self) -> DateTime<Utc>;

    /// Get current Unix timestamp in seconds
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }

    /// Get current Unix timestamp in milliseconds
    fn unix_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// System clock implementation using actual system time
#[derive(Debug, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Target module/component
    pub target: String,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: HashMap<String, String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, target, message)
    }

    /// Build an entry stamped with an explicit time, typically taken from an
    /// injected [`Clock`].
    pub fn at(
        timestamp: DateTime<Utc>,
        level: LogLevel,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            timestamp,
            target: target.into(),
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Logger sink trait
///
/// Forwards structured logs from the core to host logging pipelines:
/// - **iOS**: OSLog
/// - **Android**: Logcat
/// - **Desktop**: Console, file logs, or system logging
///
/// # Security
///
/// Implementations should ensure no sensitive data (tokens, personal stream
/// URLs) is logged and that log levels respect debug/release configurations.
pub trait LoggerSink: Send + Sync {
    /// Deliver one structured log entry to the host.
    fn log(&self, entry: LogEntry);

    /// Minimum level the sink wants to receive. Entries below this level are
    /// dropped before delivery.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Logger sink that prints entries to standard error. Useful for desktop
/// development and tests.
#[derive(Debug, Default, Clone)]
pub struct ConsoleLogger;

impl LoggerSink for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        eprintln!(
            "[{:?}] {} {}: {}",
            entry.level, entry.timestamp, entry.target, entry.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let a = clock.unix_timestamp_millis();
        let b = clock.unix_timestamp_millis();
        assert!(b >= a);
    }

    #[test]
    fn log_entry_builder() {
        let entry = LogEntry::new(LogLevel::Warn, "core_playback", "artwork fetch failed")
            .with_field("url", "https://example.com/a.jpg");
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.fields.get("url").unwrap(), "https://example.com/a.jpg");
    }

    #[test]
    fn log_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Info);
    }
}
