//! Structured diagnostic logging
//!
//! Diagnostics never share a stream with probe output: every entry is
//! written to stderr (or an injected writer), so `-j` keeps stdout a clean
//! sequence of JSON events. Each run gets a random session id attached to
//! every entry.
//!
//! ```no_run
//! use tcping::logging::Logger;
//!
//! let logger = Logger::new("resolver");
//! logger.debug("Lookup failed, keeping previous address")
//!     .field("host", "example.com")
//!     .log();
//! ```

use crate::error::AppError;
use crate::models::Config;
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn colorize(&self, text: &str) -> String {
        match self {
            LogLevel::Debug => text.cyan().to_string(),
            LogLevel::Info => text.green().to_string(),
            LogLevel::Warn => text.yellow().to_string(),
            LogLevel::Error => text.red().to_string(),
        }
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per entry
    Json,
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
    /// Component that produced the entry
    pub logger: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
}

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Leveled logger; clones and [`Logger::named`] children share one writer
/// and one session id.
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
    session_id: Arc<str>,
    writer: SharedWriter,
}

impl Logger {
    /// Create a logger at `Warn` level writing to stderr
    pub fn new(name: &str) -> Self {
        Self::with_writer(name, Box::new(io::stderr()))
    }

    /// Create a logger writing to an arbitrary destination
    pub fn with_writer(name: &str, writer: Box<dyn Write + Send>) -> Self {
        Self {
            min_level: LogLevel::Warn,
            use_color: false,
            format: LogFormat::Console,
            name: name.to_string(),
            session_id: Arc::from(Uuid::new_v4().to_string()),
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Take level, colors and format from the run configuration.
    ///
    /// JSON output switches diagnostics to JSON as well so that both
    /// streams stay machine readable.
    pub fn apply_config(&mut self, config: &Config) {
        self.min_level = if config.debug { LogLevel::Debug } else { LogLevel::Warn };
        self.use_color = config.enable_color;
        self.format = if config.output.is_json() {
            LogFormat::Json
        } else {
            LogFormat::Console
        };
    }

    /// Child logger for another component sharing this session
    pub fn named(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn write_entry(&self, entry: &LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let output = match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => Self::format_json(entry),
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", output);
            let _ = writer.flush();
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.use_color {
            entry.level.colorize(&level)
        } else {
            level
        };

        let mut output = format!("{} {} [{}] {}", timestamp, level, entry.logger, entry.message);

        if !entry.fields.is_empty() {
            let fields: Vec<String> = entry
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        // First 8 chars are enough to tell runs apart
        output.push_str(&format!(" [{}]", &entry.session_id[..entry.session_id.len().min(8)]));
        output
    }

    fn format_json(entry: &LogEntry) -> String {
        serde_json::to_string(entry).unwrap_or_else(|_| {
            serde_json::json!({
                "error": "Failed to serialize log entry",
                "message": entry.message,
            })
            .to_string()
        })
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("min_level", &self.min_level)
            .field("format", &self.format)
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Local::now(),
                level,
                message,
                logger: logger.name.clone(),
                session_id: logger.session_id.to_string(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Attach category and exit code of an error
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error", error.to_string())
            .field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    pub fn log(self) {
        self.logger.write_entry(&self.entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::testing::CaptureBuffer;
    use crate::types::OutputFormat;

    fn capture(name: &str) -> (Logger, CaptureBuffer) {
        let buffer = CaptureBuffer::default();
        let logger = Logger::with_writer(name, Box::new(buffer.clone()));
        (logger, buffer)
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_default_level_filters_debug() {
        let (logger, buffer) = capture("test");
        logger.debug("hidden").log();
        logger.warn("shown").log();

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("WARN"));
        assert!(lines[0].contains("[test] shown"));
    }

    #[test]
    fn test_apply_config_levels() {
        let (mut logger, _buffer) = capture("test");
        let config = Config {
            debug: true,
            enable_color: false,
            ..Default::default()
        };
        logger.apply_config(&config);
        assert_eq!(logger.level(), LogLevel::Debug);
        assert!(logger.would_log(LogLevel::Debug));

        logger.apply_config(&Config::default());
        assert_eq!(logger.level(), LogLevel::Warn);
        assert!(!logger.would_log(LogLevel::Info));
    }

    #[test]
    fn test_json_format_includes_fields_and_session() {
        let (mut logger, buffer) = capture("resolver");
        let config = Config {
            debug: true,
            output: OutputFormat::Json,
            enable_color: false,
            ..Default::default()
        };
        logger.apply_config(&config);

        logger.debug("lookup failed").field("host", "example.com").log();

        let value: serde_json::Value = serde_json::from_str(&buffer.lines()[0]).unwrap();
        assert_eq!(value["level"], "Debug");
        assert_eq!(value["logger"], "resolver");
        assert_eq!(value["fields"]["host"], "example.com");
        assert_eq!(value["session_id"], logger.session_id());
    }

    #[test]
    fn test_named_children_share_session_and_writer() {
        let (logger, buffer) = capture("app");
        let child = logger.named("executor");

        assert_eq!(child.session_id(), logger.session_id());

        child
            .warn("boom")
            .error_info(&AppError::dns_resolution("Failed to resolve example.com"))
            .log();
        let contents = buffer.contents();
        assert!(contents.contains("[executor] boom"));
        assert!(contents.contains("error_category=\"DNS\""));
    }
}
