//! Human-readable printer with optional ANSI colors

use super::{format_clock, format_duration, format_timestamp, Reporter, Sink};
use crate::{
    models::{LongestTime, StatisticsReport},
    VersionInfo,
};
use colored::*;
use std::io::Write;
use std::net::IpAddr;
use std::time::Duration;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::BrightCyan,
            success: Color::BrightGreen,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Plain-text printer; colors are applied only when enabled
pub struct ColoredPrinter {
    out: Sink,
    err: Sink,
    enable_color: bool,
    color_scheme: ColorScheme,
}

impl ColoredPrinter {
    /// Create a printer writing to stdout, with errors on stderr
    pub fn new(enable_color: bool) -> Self {
        Self {
            out: Sink::stdout(),
            err: Sink::stderr(),
            enable_color,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Create a printer writing to arbitrary destinations
    pub fn with_writers(
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
        enable_color: bool,
    ) -> Self {
        Self {
            out: Sink::new(out),
            err: Sink::new(err),
            enable_color,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold formatting if colors are enabled
    fn bold(&self, text: &str, color: Color) -> ColoredString {
        if self.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn format_packet_loss(&self, loss: f64) -> ColoredString {
        let formatted = format!("{:.2}%", loss);
        let color = if loss == 0.0 {
            self.color_scheme.success
        } else if loss < 20.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        };
        self.colorize(&formatted, color)
    }

    fn endpoint(hostname: Option<&str>, ip: IpAddr) -> String {
        match hostname {
            Some(host) => format!("{} ({})", host, ip),
            None => ip.to_string(),
        }
    }

    fn format_longest(&self, label: &str, record: Option<&LongestTime>, color: Color) -> String {
        match record {
            Some(longest) => format!(
                "{} {} from {} to {}",
                label,
                self.colorize(&format_duration(longest.duration), color),
                format_timestamp(&longest.start),
                format_timestamp(&longest.end),
            ),
            None => format!("{} {}", label, self.colorize("none", self.color_scheme.muted)),
        }
    }

    /// Build the statistics block line by line
    pub fn format_statistics(&self, report: &StatisticsReport) -> Vec<String> {
        let scheme = &self.color_scheme;
        let mut lines = Vec::new();

        let title = format!(
            "--- {} TCPing statistics ---",
            Self::endpoint(report.hostname.as_deref(), report.ip)
        );
        lines.push(String::new());
        lines.push(self.bold(&title, scheme.header).to_string());

        lines.push(format!(
            "{} probes transmitted on port {} | {} received, {} packet loss",
            report.total_probes(),
            report.port,
            report.total_successful,
            self.format_packet_loss(report.packet_loss()),
        ));
        lines.push(format!(
            "successful probes:   {}",
            self.colorize(&report.total_successful.to_string(), scheme.success)
        ));
        lines.push(format!(
            "unsuccessful probes: {}",
            self.colorize(&report.total_unsuccessful.to_string(), scheme.error)
        ));

        let last_success = report
            .last_successful_probe
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "Never succeeded".to_string());
        let last_failure = report
            .last_unsuccessful_probe
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "Never failed".to_string());
        lines.push(format!("last successful probe:   {}", self.colorize(&last_success, scheme.success)));
        lines.push(format!("last unsuccessful probe: {}", self.colorize(&last_failure, scheme.error)));

        lines.push(format!(
            "total uptime:   {}",
            self.colorize(&format_duration(report.total_uptime), scheme.success)
        ));
        lines.push(format!(
            "total downtime: {}",
            self.colorize(&format_duration(report.total_downtime), scheme.error)
        ));
        lines.push(self.format_longest(
            "longest consecutive uptime:  ",
            report.longest_uptime.as_ref(),
            scheme.success,
        ));
        lines.push(self.format_longest(
            "longest consecutive downtime:",
            report.longest_downtime.as_ref(),
            scheme.error,
        ));

        if report.hostname.is_some() && report.retried_resolves > 0 {
            let times = if report.retried_resolves == 1 { "time" } else { "times" };
            lines.push(format!(
                "retried to resolve hostname {} {}",
                self.colorize(&report.retried_resolves.to_string(), scheme.warning),
                times
            ));
        }

        if report.rtt.has_results {
            lines.push(format!(
                "rtt {}: {}/{}/{} ms",
                self.colorize("min/avg/max", scheme.info),
                self.colorize(&format!("{:.3}", report.rtt.min), scheme.success),
                self.colorize(&format!("{:.3}", report.rtt.average), scheme.warning),
                self.colorize(&format!("{:.3}", report.rtt.max), scheme.error),
            ));
        }

        lines.push(self.colorize("--------------------------------------", scheme.muted).to_string());
        lines.push(format!("TCPing started at: {}", format_timestamp(&report.start_time)));
        lines.push(format!("TCPing ended at:   {}", format_timestamp(&report.end_time)));
        lines.push(format!("duration (HH:MM:SS): {}", format_clock(report.run_duration())));
        lines.push(String::new());

        lines
    }
}

impl Reporter for ColoredPrinter {
    fn print_start(&self, hostname: &str, port: u16) {
        let line = format!("TCPinging {} on port {}", hostname, port);
        self.out.line(&self.colorize(&line, self.color_scheme.header).to_string());
    }

    fn print_probe_success(&self, hostname: Option<&str>, ip: IpAddr, port: u16, streak: u64, rtt_ms: f64) {
        let line = format!(
            "Reply from {} on port {} TCP_conn={} time={:.3} ms",
            Self::endpoint(hostname, ip),
            port,
            streak,
            rtt_ms,
        );
        self.out.line(&self.colorize(&line, self.color_scheme.success).to_string());
    }

    fn print_probe_fail(&self, hostname: Option<&str>, ip: IpAddr, port: u16, streak: u64) {
        let line = format!(
            "No reply from {} on port {} TCP_conn={}",
            Self::endpoint(hostname, ip),
            port,
            streak,
        );
        self.out.line(&self.colorize(&line, self.color_scheme.error).to_string());
    }

    fn print_retrying_to_resolve(&self, hostname: &str) {
        let line = format!("Retrying to resolve {}", hostname);
        self.out.line(&self.colorize(&line, self.color_scheme.warning).to_string());
    }

    fn print_total_downtime(&self, downtime: Duration) {
        let line = format!("No response received for {}", format_duration(downtime));
        self.out.line(&self.colorize(&line, self.color_scheme.warning).to_string());
    }

    fn print_statistics(&self, report: &StatisticsReport) {
        for line in self.format_statistics(report) {
            self.out.line(&line);
        }
    }

    fn print_version(&self, info: &VersionInfo) {
        let line = format!("TCPING version {}", info.version);
        self.out.line(&self.bold(&line, self.color_scheme.header).to_string());
        self.out.line(&self.colorize(
            &format!("commit {} built {} for {}", info.git_commit, info.build_time, info.target),
            self.color_scheme.muted,
        ).to_string());
    }

    fn print_info(&self, message: &str) {
        self.out.line(&self.colorize(message, self.color_scheme.info).to_string());
    }

    fn print_error(&self, message: &str) {
        self.err.line(&self.colorize(message, self.color_scheme.error).to_string());
    }
}
