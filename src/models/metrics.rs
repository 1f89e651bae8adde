//! Probe outcomes and statistics snapshot models

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Result of a single TCP connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Connection was established before the timeout
    pub success: bool,
    /// Elapsed dial time in fractional milliseconds
    pub rtt_ms: f64,
}

impl ProbeOutcome {
    pub fn success(rtt_ms: f64) -> Self {
        Self { success: true, rtt_ms }
    }

    pub fn failure(rtt_ms: f64) -> Self {
        Self { success: false, rtt_ms }
    }
}

/// Longest consecutive up or down session seen so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongestTime {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub duration: Duration,
}

impl LongestTime {
    /// Build a record spanning `duration` from `start`
    pub fn new(start: DateTime<Local>, duration: Duration) -> Self {
        let end = chrono::Duration::from_std(duration)
            .map(|delta| start + delta)
            .unwrap_or(start);
        Self { start, end, duration }
    }
}

/// Min/avg/max over the collected round-trip times
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RttResults {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub has_results: bool,
}

impl RttResults {
    /// Compute extrema and arithmetic mean; all zero for an empty buffer
    pub fn from_samples(samples: &[f64]) -> Self {
        let Some(&first) = samples.first() else {
            return Self::default();
        };

        let (min, max, sum) = samples.iter().fold(
            (first, first, 0.0),
            |(min, max, sum), &rtt| (min.min(rtt), max.max(rtt), sum + rtt),
        );

        Self {
            min,
            max,
            average: sum / samples.len() as f64,
            has_results: true,
        }
    }
}

/// Read-only statistics snapshot handed to reporters
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsReport {
    /// Hostname as typed, `None` when the target was a literal IP
    pub hostname: Option<String>,
    pub ip: IpAddr,
    pub port: u16,
    pub total_successful: u64,
    pub total_unsuccessful: u64,
    pub last_successful_probe: Option<DateTime<Local>>,
    pub last_unsuccessful_probe: Option<DateTime<Local>>,
    pub total_uptime: Duration,
    pub total_downtime: Duration,
    pub longest_uptime: Option<LongestTime>,
    pub longest_downtime: Option<LongestTime>,
    pub retried_resolves: u32,
    pub rtt: RttResults,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
}

impl StatisticsReport {
    pub fn total_probes(&self) -> u64 {
        self.total_successful + self.total_unsuccessful
    }

    /// Percentage of unsuccessful probes
    pub fn packet_loss(&self) -> f64 {
        let total = self.total_probes();
        if total == 0 {
            0.0
        } else {
            self.total_unsuccessful as f64 / total as f64 * 100.0
        }
    }

    /// Wall-clock span between start and end of the run
    pub fn run_duration(&self) -> Duration {
        (self.end_time - self.start_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
