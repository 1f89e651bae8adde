//! Test doubles for reporters and output capture

use super::Reporter;
use crate::{models::StatisticsReport, VersionInfo};
use std::io::{self, Write};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cloneable in-memory writer
#[derive(Clone, Default)]
pub(crate) struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Every call a reporter received, in order
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Start(String, u16),
    Success { ip: IpAddr, streak: u64, rtt_ms: f64 },
    Fail { ip: IpAddr, streak: u64 },
    Retrying(String),
    Downtime(Duration),
    Statistics(Box<StatisticsReport>),
    Version,
    Info(String),
    Error(String),
}

#[derive(Clone, Default)]
pub(crate) struct RecordingReporter {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn print_start(&self, hostname: &str, port: u16) {
        self.push(Event::Start(hostname.to_string(), port));
    }

    fn print_probe_success(&self, _hostname: Option<&str>, ip: IpAddr, _port: u16, streak: u64, rtt_ms: f64) {
        self.push(Event::Success { ip, streak, rtt_ms });
    }

    fn print_probe_fail(&self, _hostname: Option<&str>, ip: IpAddr, _port: u16, streak: u64) {
        self.push(Event::Fail { ip, streak });
    }

    fn print_retrying_to_resolve(&self, hostname: &str) {
        self.push(Event::Retrying(hostname.to_string()));
    }

    fn print_total_downtime(&self, downtime: Duration) {
        self.push(Event::Downtime(downtime));
    }

    fn print_statistics(&self, report: &StatisticsReport) {
        self.push(Event::Statistics(Box::new(report.clone())));
    }

    fn print_version(&self, _info: &VersionInfo) {
        self.push(Event::Version);
    }

    fn print_info(&self, message: &str) {
        self.push(Event::Info(message.to_string()));
    }

    fn print_error(&self, message: &str) {
        self.push(Event::Error(message.to_string()));
    }
}
