//! Property-based tests for the running statistics
//!
//! Random success/failure sequences are replayed through [`RunningStats`]
//! and the accounting invariants are checked after every step.

use super::RunningStats;
use crate::{
    models::ProbeTarget,
    output::testing::{Event, RecordingReporter},
    types::AddressFamily,
};
use chrono::{DateTime, Local, TimeZone};
use proptest::collection::vec;
use proptest::prelude::*;
use std::time::Duration;

/// Property-based test generators
mod generators {
    use super::*;

    /// A probe result: `Some(rtt)` on success, `None` on failure
    pub fn probe_results() -> impl Strategy<Value = Vec<Option<f64>>> {
        vec(prop_oneof![Just(None), (0.1f64..500.0).prop_map(Some)], 0..200)
    }

    pub fn interval_ms() -> impl Strategy<Value = u64> {
        prop_oneof![Just(1000u64), 1u64..5000]
    }
}

fn base_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// State observed right after one recorded probe
#[derive(Debug, Clone, Copy)]
struct Observation {
    ongoing_successful: u64,
    ongoing_unsuccessful: u64,
    longest_uptime: Duration,
    longest_downtime: Duration,
}

impl Observation {
    fn of(stats: &RunningStats) -> Self {
        Self {
            ongoing_successful: stats.ongoing_successful(),
            ongoing_unsuccessful: stats.ongoing_unsuccessful(),
            longest_uptime: stats.longest_uptime().map(|l| l.duration).unwrap_or_default(),
            longest_downtime: stats.longest_downtime().map(|l| l.duration).unwrap_or_default(),
        }
    }
}

fn replay_observed(
    results: &[Option<f64>],
    interval: Duration,
) -> (RunningStats, RecordingReporter, Vec<Observation>) {
    let reporter = RecordingReporter::default();
    let target = ProbeTarget::new("example.com".to_string(), 80, AddressFamily::Any);
    let mut stats = RunningStats::new(target, "198.51.100.4".parse().unwrap(), interval, base_time());
    let mut observations = Vec::with_capacity(results.len());

    for (i, result) in results.iter().enumerate() {
        let now = base_time() + chrono::Duration::from_std(interval * i as u32).unwrap();
        match result {
            Some(rtt) => stats.on_success(*rtt, now, &reporter),
            None => stats.on_failure(now, &reporter),
        }
        observations.push(Observation::of(&stats));
    }

    (stats, reporter, observations)
}

fn replay(results: &[Option<f64>], interval: Duration) -> (RunningStats, RecordingReporter) {
    let (stats, reporter, _) = replay_observed(results, interval);
    (stats, reporter)
}

mod property_tests {
    use super::generators::*;
    use super::*;

    proptest! {
        #[test]
        fn prop_uptime_and_downtime_cover_every_probe(
            results in probe_results(),
            interval in interval_ms(),
        ) {
            let interval = Duration::from_millis(interval);
            let (stats, _) = replay(&results, interval);

            let successes = results.iter().filter(|r| r.is_some()).count() as u64;
            prop_assert_eq!(stats.total_successful(), successes);
            prop_assert_eq!(stats.total_probes(), results.len() as u64);
            prop_assert_eq!(
                stats.total_uptime() + stats.total_downtime(),
                interval * stats.total_probes() as u32
            );
            prop_assert_eq!(stats.rtt_samples().len() as u64, successes);
        }

        #[test]
        fn prop_at_most_one_streak_is_active(results in probe_results()) {
            let (stats, _, observations) = replay_observed(&results, Duration::from_secs(1));

            for (step, seen) in observations.iter().enumerate() {
                prop_assert!(
                    seen.ongoing_successful == 0 || seen.ongoing_unsuccessful == 0,
                    "both streaks active after probe {}: {:?}",
                    step,
                    seen
                );
            }
            match results.last() {
                Some(Some(_)) => {
                    prop_assert!(!stats.is_down());
                    prop_assert!(stats.ongoing_successful() > 0);
                }
                Some(None) => {
                    prop_assert!(stats.is_down());
                    prop_assert!(stats.ongoing_unsuccessful() > 0);
                }
                None => prop_assert!(!stats.has_probes()),
            }
        }

        #[test]
        fn prop_one_downtime_notice_per_recovery(results in probe_results()) {
            let (_, reporter) = replay(&results, Duration::from_secs(1));

            let recoveries = results
                .windows(2)
                .filter(|pair| pair[0].is_none() && pair[1].is_some())
                .count();
            prop_assert_eq!(reporter.count(|e| matches!(e, Event::Downtime(_))), recoveries);
        }

        #[test]
        fn prop_longest_records_match_longest_runs(results in probe_results()) {
            let (stats, _) = replay(&results, Duration::from_secs(1));
            let report = stats.snapshot(base_time());

            let longest_run = |want_success: bool| {
                let mut best = 0u64;
                let mut current = 0u64;
                for result in &results {
                    if result.is_some() == want_success {
                        current += 1;
                        best = best.max(current);
                    } else {
                        current = 0;
                    }
                }
                best
            };

            let uptime = report.longest_uptime.map(|l| l.duration.as_secs()).unwrap_or(0);
            let downtime = report.longest_downtime.map(|l| l.duration.as_secs()).unwrap_or(0);
            prop_assert_eq!(uptime, longest_run(true));
            prop_assert_eq!(downtime, longest_run(false));
        }

        #[test]
        fn prop_longest_records_never_shrink(
            results in probe_results(),
            interval in interval_ms(),
        ) {
            let (_, _, observations) = replay_observed(&results, Duration::from_millis(interval));

            for (step, pair) in observations.windows(2).enumerate() {
                prop_assert!(
                    pair[1].longest_uptime >= pair[0].longest_uptime,
                    "longest uptime shrank at probe {}: {:?} -> {:?}",
                    step + 1,
                    pair[0],
                    pair[1]
                );
                prop_assert!(
                    pair[1].longest_downtime >= pair[0].longest_downtime,
                    "longest downtime shrank at probe {}: {:?} -> {:?}",
                    step + 1,
                    pair[0],
                    pair[1]
                );
            }
        }

        #[test]
        fn prop_rtt_summary_bounds(results in probe_results()) {
            let (stats, _) = replay(&results, Duration::from_secs(1));
            let rtt = stats.rtt_results();

            if stats.total_successful() == 0 {
                prop_assert!(!rtt.has_results);
            } else {
                prop_assert!(rtt.has_results);
                prop_assert!(rtt.min <= rtt.average + 1e-9);
                prop_assert!(rtt.average <= rtt.max + 1e-9);
            }
        }

        #[test]
        fn prop_snapshot_does_not_mutate(results in probe_results()) {
            let (stats, _) = replay(&results, Duration::from_secs(1));
            let before = stats.clone();

            let first = stats.closing_snapshot();
            let second = stats.closing_snapshot();

            prop_assert_eq!(first, second);
            prop_assert_eq!(stats, before);
        }
    }
}
