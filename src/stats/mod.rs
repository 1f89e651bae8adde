//! Availability statistics for a single probed endpoint
//!
//! [`RunningStats`] is the only mutable state of a run. It is owned by the
//! probe executor and changed exclusively through [`RunningStats::on_success`],
//! [`RunningStats::on_failure`] and [`RunningStats::record_resolve_retry`].
//!
//! Uptime and downtime are accumulated in whole probe intervals rather than
//! measured wall-clock time, so
//! `total_uptime + total_downtime == total_probes * interval` always holds.

use crate::{
    models::{LongestTime, ProbeTarget, RttResults, StatisticsReport},
    output::Reporter,
};
use chrono::{DateTime, Local};
use std::net::IpAddr;
use std::time::Duration;

#[cfg(test)]
mod comprehensive_tests;

/// Running counters, session markers and RTT samples of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunningStats {
    target: ProbeTarget,
    ip: IpAddr,
    interval: Duration,

    total_successful: u64,
    total_unsuccessful: u64,
    ongoing_successful: u64,
    ongoing_unsuccessful: u64,
    retried_resolves: u32,

    start_time: DateTime<Local>,
    last_successful_probe: Option<DateTime<Local>>,
    last_unsuccessful_probe: Option<DateTime<Local>>,
    total_uptime: Duration,
    total_downtime: Duration,

    start_of_uptime: Option<DateTime<Local>>,
    start_of_downtime: Option<DateTime<Local>>,
    was_down: bool,

    longest_uptime: Option<LongestTime>,
    longest_downtime: Option<LongestTime>,

    rtt: Vec<f64>,
}

impl RunningStats {
    /// Start tracking a run against an already resolved address
    pub fn new(target: ProbeTarget, ip: IpAddr, interval: Duration, start_time: DateTime<Local>) -> Self {
        Self {
            target,
            ip,
            interval,
            total_successful: 0,
            total_unsuccessful: 0,
            ongoing_successful: 0,
            ongoing_unsuccessful: 0,
            retried_resolves: 0,
            start_time,
            last_successful_probe: None,
            last_unsuccessful_probe: None,
            total_uptime: Duration::ZERO,
            total_downtime: Duration::ZERO,
            start_of_uptime: None,
            start_of_downtime: None,
            was_down: false,
            longest_uptime: None,
            longest_downtime: None,
            rtt: Vec::new(),
        }
    }

    /// Record a failed probe completed at `now`
    pub fn on_failure(&mut self, now: DateTime<Local>, reporter: &dyn Reporter) {
        if !self.was_down {
            self.start_of_downtime = Some(now);
            let uptime = self.intervals(self.ongoing_successful);
            Self::offer_longest(&mut self.longest_uptime, self.start_of_uptime, uptime);
            self.start_of_uptime = None;
            self.was_down = true;
        }

        self.total_downtime += self.interval;
        self.last_unsuccessful_probe = Some(now);
        self.total_unsuccessful += 1;
        self.ongoing_unsuccessful += 1;
        // A failure always ends the success streak
        self.ongoing_successful = 0;

        reporter.print_probe_fail(
            self.target.display_host(),
            self.ip,
            self.target.port,
            self.ongoing_unsuccessful,
        );
    }

    /// Record a successful probe with its round-trip time in milliseconds
    pub fn on_success(&mut self, rtt_ms: f64, now: DateTime<Local>, reporter: &dyn Reporter) {
        if self.was_down {
            let downtime = self.intervals(self.ongoing_unsuccessful);
            reporter.print_total_downtime(downtime);
            self.start_of_uptime = Some(now);
            Self::offer_longest(&mut self.longest_downtime, self.start_of_downtime, downtime);
            self.start_of_downtime = None;
            self.was_down = false;
            self.ongoing_unsuccessful = 0;
            self.ongoing_successful = 0;
        }

        if self.start_of_uptime.is_none() {
            self.start_of_uptime = Some(now);
        }

        self.total_uptime += self.interval;
        self.last_successful_probe = Some(now);
        self.total_successful += 1;
        self.ongoing_successful += 1;
        self.rtt.push(rtt_ms);

        reporter.print_probe_success(
            self.target.display_host(),
            self.ip,
            self.target.port,
            self.ongoing_successful,
            rtt_ms,
        );
    }

    /// Replace the active address after a hostname re-resolution.
    ///
    /// The failure streak restarts even when the address did not change.
    pub fn record_resolve_retry(&mut self, ip: IpAddr) {
        self.ip = ip;
        self.ongoing_unsuccessful = 0;
        self.retried_resolves += 1;
    }

    /// Read-only snapshot ending at `end_time`
    pub fn snapshot(&self, end_time: DateTime<Local>) -> StatisticsReport {
        StatisticsReport {
            hostname: self.target.display_host().map(str::to_string),
            ip: self.ip,
            port: self.target.port,
            total_successful: self.total_successful,
            total_unsuccessful: self.total_unsuccessful,
            last_successful_probe: self.last_successful_probe,
            last_unsuccessful_probe: self.last_unsuccessful_probe,
            total_uptime: self.total_uptime,
            total_downtime: self.total_downtime,
            longest_uptime: self.effective_longest_uptime(),
            longest_downtime: self.effective_longest_downtime(),
            retried_resolves: self.retried_resolves,
            rtt: self.rtt_results(),
            start_time: self.start_time,
            end_time,
        }
    }

    /// Snapshot whose end time is derived from the probe count, used on interrupt
    pub fn closing_snapshot(&self) -> StatisticsReport {
        let elapsed = chrono::Duration::from_std(self.intervals(self.total_probes()))
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.snapshot(self.start_time + elapsed)
    }

    pub fn rtt_results(&self) -> RttResults {
        RttResults::from_samples(&self.rtt)
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    /// Currently active address
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub fn total_successful(&self) -> u64 {
        self.total_successful
    }

    pub fn total_unsuccessful(&self) -> u64 {
        self.total_unsuccessful
    }

    pub fn total_probes(&self) -> u64 {
        self.total_successful + self.total_unsuccessful
    }

    pub fn has_probes(&self) -> bool {
        self.total_probes() > 0
    }

    pub fn ongoing_successful(&self) -> u64 {
        self.ongoing_successful
    }

    pub fn ongoing_unsuccessful(&self) -> u64 {
        self.ongoing_unsuccessful
    }

    pub fn retried_resolves(&self) -> u32 {
        self.retried_resolves
    }

    pub fn total_uptime(&self) -> Duration {
        self.total_uptime
    }

    pub fn total_downtime(&self) -> Duration {
        self.total_downtime
    }

    pub fn is_down(&self) -> bool {
        self.was_down
    }

    /// Longest closed uptime session recorded so far
    pub fn longest_uptime(&self) -> Option<&LongestTime> {
        self.longest_uptime.as_ref()
    }

    /// Longest closed downtime session recorded so far
    pub fn longest_downtime(&self) -> Option<&LongestTime> {
        self.longest_downtime.as_ref()
    }

    pub fn rtt_samples(&self) -> &[f64] {
        &self.rtt
    }

    fn intervals(&self, count: u64) -> Duration {
        self.interval
            .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Replace `record` when the candidate session is at least as long.
    /// Sessions that never started or lasted zero intervals are ignored.
    fn offer_longest(record: &mut Option<LongestTime>, start: Option<DateTime<Local>>, duration: Duration) {
        let Some(start) = start else {
            return;
        };
        if duration.is_zero() {
            return;
        }

        let candidate = LongestTime::new(start, duration);
        match record {
            Some(current) if candidate.duration < current.duration => {}
            _ => *record = Some(candidate),
        }
    }

    /// Recorded longest uptime, also considering the session still in progress
    fn effective_longest_uptime(&self) -> Option<LongestTime> {
        let mut longest = self.longest_uptime;
        if !self.was_down {
            Self::offer_longest(&mut longest, self.start_of_uptime, self.intervals(self.ongoing_successful));
        }
        longest
    }

    fn effective_longest_downtime(&self) -> Option<LongestTime> {
        let mut longest = self.longest_downtime;
        if self.was_down {
            Self::offer_longest(&mut longest, self.start_of_downtime, self.intervals(self.ongoing_unsuccessful));
        }
        longest
    }
}
