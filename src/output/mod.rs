//! Output reporting system
//!
//! Everything the probe loop wants the user to see goes through the
//! [`Reporter`] trait. Two implementations exist: a human-readable printer
//! with optional colors and a JSON printer emitting one object per event.
//! The implementation is chosen once at startup by [`ReporterFactory`].

mod colored;
mod json;
#[cfg(test)]
pub(crate) mod testing;

pub use self::colored::ColoredPrinter;
pub use self::json::JsonPrinter;

use crate::{models::StatisticsReport, types::OutputFormat, VersionInfo};
use chrono::{DateTime, Local};
use std::io::{self, Write};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

/// Capabilities the probe loop needs from an output printer.
///
/// Reporters only render what they are given: they never mutate the data
/// and never compute statistics themselves.
pub trait Reporter: Send + Sync {
    /// First message of the run, printed once
    fn print_start(&self, hostname: &str, port: u16);

    /// One successful probe. `hostname` is `None` when probing a literal IP.
    fn print_probe_success(&self, hostname: Option<&str>, ip: IpAddr, port: u16, streak: u64, rtt_ms: f64);

    /// One failed probe. `streak` is the number of consecutive failures.
    fn print_probe_fail(&self, hostname: Option<&str>, ip: IpAddr, port: u16, streak: u64);

    /// The hostname is about to be resolved again after repeated failures
    fn print_retrying_to_resolve(&self, hostname: &str);

    /// The host answered again after being unreachable for `downtime`
    fn print_total_downtime(&self, downtime: Duration);

    /// Full statistics snapshot, on Enter, on completion and on interrupt
    fn print_statistics(&self, report: &StatisticsReport);

    fn print_version(&self, info: &VersionInfo);

    /// Informational text not tied to probing (e.g. update check results)
    fn print_info(&self, message: &str);

    fn print_error(&self, message: &str);
}

/// Factory selecting the reporter implementation for a run
pub struct ReporterFactory;

impl ReporterFactory {
    /// Create a reporter writing to the process stdout/stderr
    pub fn create(format: OutputFormat, enable_color: bool) -> Box<dyn Reporter> {
        match format {
            OutputFormat::Plain => Box::new(ColoredPrinter::new(enable_color)),
            OutputFormat::Json => Box::new(JsonPrinter::new(false)),
            OutputFormat::Pretty => Box::new(JsonPrinter::new(true)),
        }
    }
}

/// Line-oriented, thread-safe output destination
pub(crate) struct Sink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Sink {
    pub(crate) fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub(crate) fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub(crate) fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }

    /// Write one line; output failures are ignored like `println!` callers would
    pub(crate) fn line(&self, text: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", text);
            let _ = writer.flush();
        }
    }
}

/// Render a duration as "1 hour 2 minutes 3 seconds"
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let unit = |value: u64, name: &str| {
        if value == 1 {
            format!("{} {}", value, name)
        } else {
            format!("{} {}s", value, name)
        }
    };

    if hours > 0 {
        format!("{} {} {}", unit(hours, "hour"), unit(minutes, "minute"), unit(seconds, "second"))
    } else if minutes > 0 {
        format!("{} {}", unit(minutes, "minute"), unit(seconds, "second"))
    } else {
        unit(seconds, "second")
    }
}

/// Render a duration as HH:MM:SS
pub fn format_clock(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Timestamp layout shared by both printers
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
