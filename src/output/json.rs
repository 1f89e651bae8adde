//! JSON printer emitting one object per event

use super::{format_duration, format_timestamp, Reporter, Sink};
use crate::{models::StatisticsReport, VersionInfo};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;
use std::net::IpAddr;
use std::time::Duration;

/// Event payloads, tagged by `type`
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
enum Event<'a> {
    Start {
        hostname: &'a str,
        port: u16,
    },
    Probe {
        #[serde(skip_serializing_if = "Option::is_none")]
        hostname: Option<&'a str>,
        ip: IpAddr,
        port: u16,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        latency: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        successful_probes: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        unsuccessful_probes: Option<u64>,
    },
    Retry {
        hostname: &'a str,
    },
    Downtime {
        downtime_seconds: f64,
    },
    Statistics(StatisticsJson),
    Version {
        version: &'a str,
        git_commit: &'a str,
        build_time: &'a str,
        target: &'a str,
    },
    Info,
    Error,
}

/// Wire shape of a statistics snapshot
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
    ip: IpAddr,
    port: u16,
    total_packets: u64,
    total_successful_probes: u64,
    total_unsuccessful_probes: u64,
    total_packet_loss: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_successful_probe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_unsuccessful_probe: Option<String>,
    total_uptime_seconds: f64,
    total_downtime_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_uptime: Option<LongestJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_downtime: Option<LongestJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname_resolve_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_max: Option<f64>,
    start_timestamp: String,
    end_timestamp: String,
    total_duration_seconds: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LongestJson {
    duration_seconds: f64,
    start: String,
    end: String,
}

impl From<&StatisticsReport> for StatisticsJson {
    fn from(report: &StatisticsReport) -> Self {
        let longest = |record: Option<&crate::models::LongestTime>| {
            record.map(|longest| LongestJson {
                duration_seconds: longest.duration.as_secs_f64(),
                start: longest.start.to_rfc3339(),
                end: longest.end.to_rfc3339(),
            })
        };
        let rtt = report.rtt.has_results.then_some(report.rtt);

        Self {
            hostname: report.hostname.clone(),
            ip: report.ip,
            port: report.port,
            total_packets: report.total_probes(),
            total_successful_probes: report.total_successful,
            total_unsuccessful_probes: report.total_unsuccessful,
            total_packet_loss: report.packet_loss(),
            last_successful_probe: report.last_successful_probe.map(|t| t.to_rfc3339()),
            last_unsuccessful_probe: report.last_unsuccessful_probe.map(|t| t.to_rfc3339()),
            total_uptime_seconds: report.total_uptime.as_secs_f64(),
            total_downtime_seconds: report.total_downtime.as_secs_f64(),
            longest_uptime: longest(report.longest_uptime.as_ref()),
            longest_downtime: longest(report.longest_downtime.as_ref()),
            hostname_resolve_retries: report.hostname.as_ref().map(|_| report.retried_resolves),
            latency_min: rtt.map(|r| r.min),
            latency_avg: rtt.map(|r| r.average),
            latency_max: rtt.map(|r| r.max),
            start_timestamp: report.start_time.to_rfc3339(),
            end_timestamp: report.end_time.to_rfc3339(),
            total_duration_seconds: report.run_duration().as_secs_f64(),
        }
    }
}

/// Envelope adding the human message and timestamp to every event
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    #[serde(flatten)]
    event: Event<'a>,
    message: String,
    timestamp: DateTime<Local>,
}

/// Printer writing every event as a JSON object to stdout
pub struct JsonPrinter {
    out: Sink,
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        Self { out: Sink::stdout(), pretty }
    }

    pub fn with_writer(out: Box<dyn Write + Send>, pretty: bool) -> Self {
        Self { out: Sink::new(out), pretty }
    }

    fn emit(&self, event: Event<'_>, message: String) {
        let envelope = Envelope {
            event,
            message,
            timestamp: Local::now(),
        };

        let encoded = if self.pretty {
            serde_json::to_string_pretty(&envelope)
        } else {
            serde_json::to_string(&envelope)
        };

        match encoded {
            Ok(json) => self.out.line(&json),
            Err(e) => self.out.line(&format!(
                "{{\"type\":\"error\",\"message\":\"failed to encode event: {}\"}}",
                e
            )),
        }
    }

    fn endpoint(hostname: Option<&str>, ip: IpAddr) -> String {
        match hostname {
            Some(host) => format!("{} ({})", host, ip),
            None => ip.to_string(),
        }
    }
}

impl Reporter for JsonPrinter {
    fn print_start(&self, hostname: &str, port: u16) {
        self.emit(
            Event::Start { hostname, port },
            format!("TCPinging {} on port {}", hostname, port),
        );
    }

    fn print_probe_success(&self, hostname: Option<&str>, ip: IpAddr, port: u16, streak: u64, rtt_ms: f64) {
        let message = format!(
            "Reply from {} on port {} TCP_conn={} time={:.3} ms",
            Self::endpoint(hostname, ip),
            port,
            streak,
            rtt_ms
        );
        self.emit(
            Event::Probe {
                hostname,
                ip,
                port,
                success: true,
                latency: Some(rtt_ms),
                successful_probes: Some(streak),
                unsuccessful_probes: None,
            },
            message,
        );
    }

    fn print_probe_fail(&self, hostname: Option<&str>, ip: IpAddr, port: u16, streak: u64) {
        let message = format!(
            "No reply from {} on port {} TCP_conn={}",
            Self::endpoint(hostname, ip),
            port,
            streak
        );
        self.emit(
            Event::Probe {
                hostname,
                ip,
                port,
                success: false,
                latency: None,
                successful_probes: None,
                unsuccessful_probes: Some(streak),
            },
            message,
        );
    }

    fn print_retrying_to_resolve(&self, hostname: &str) {
        self.emit(
            Event::Retry { hostname },
            format!("Retrying to resolve {}", hostname),
        );
    }

    fn print_total_downtime(&self, downtime: Duration) {
        self.emit(
            Event::Downtime { downtime_seconds: downtime.as_secs_f64() },
            format!("No response received for {}", format_duration(downtime)),
        );
    }

    fn print_statistics(&self, report: &StatisticsReport) {
        let message = format!(
            "stats for {} from {} to {}",
            Self::endpoint(report.hostname.as_deref(), report.ip),
            format_timestamp(&report.start_time),
            format_timestamp(&report.end_time),
        );
        self.emit(Event::Statistics(StatisticsJson::from(report)), message);
    }

    fn print_version(&self, info: &VersionInfo) {
        self.emit(
            Event::Version {
                version: &info.version,
                git_commit: &info.git_commit,
                build_time: &info.build_time,
                target: &info.target,
            },
            format!("TCPING version {}", info.version),
        );
    }

    fn print_info(&self, message: &str) {
        self.emit(Event::Info, message.to_string());
    }

    fn print_error(&self, message: &str) {
        self.emit(Event::Error, message.to_string());
    }
}
