//! Performance benchmarks for the statistics tracker and JSON output
//!
//! The probe loop runs once per second, so these mostly guard against
//! accidental quadratic behavior in long runs.

use chrono::{Duration as ChronoDuration, Local};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tcping::{
    models::ProbeTarget,
    output::{JsonPrinter, Reporter},
    stats::RunningStats,
    types::AddressFamily,
    StatisticsReport, VersionInfo,
};

/// Reporter that drops everything
struct NullReporter;

impl Reporter for NullReporter {
    fn print_start(&self, _: &str, _: u16) {}
    fn print_probe_success(&self, _: Option<&str>, _: IpAddr, _: u16, _: u64, _: f64) {}
    fn print_probe_fail(&self, _: Option<&str>, _: IpAddr, _: u16, _: u64) {}
    fn print_retrying_to_resolve(&self, _: &str) {}
    fn print_total_downtime(&self, _: Duration) {}
    fn print_statistics(&self, _: &StatisticsReport) {}
    fn print_version(&self, _: &VersionInfo) {}
    fn print_info(&self, _: &str) {}
    fn print_error(&self, _: &str) {}
}

const TARGET_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));

fn new_stats() -> RunningStats {
    RunningStats::new(
        ProbeTarget::new("example.com".to_string(), 443, AddressFamily::Any),
        TARGET_IP,
        Duration::from_secs(1),
        Local::now(),
    )
}

/// Replay `count` probes where every tenth one fails
fn replay(count: u64) -> RunningStats {
    let reporter = NullReporter;
    let mut stats = new_stats();
    let start = Local::now();

    for i in 0..count {
        let now = start + ChronoDuration::seconds(i as i64);
        if i % 10 == 9 {
            stats.on_failure(now, &reporter);
        } else {
            stats.on_success(10.0 + (i % 50) as f64, now, &reporter);
        }
    }
    stats
}

fn bench_probe_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe_recording");

    for count in [100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(replay(count)));
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    // RTT aggregation walks every sample
    for count in [1_000u64, 100_000] {
        let stats = replay(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &stats, |b, stats| {
            b.iter(|| black_box(stats.snapshot(Local::now())));
        });
    }

    group.finish();
}

fn bench_json_statistics(c: &mut Criterion) {
    let printer = JsonPrinter::with_writer(Box::new(std::io::sink()), false);
    let report = replay(1_000).snapshot(Local::now());

    c.bench_function("json_statistics", |b| {
        b.iter(|| printer.print_statistics(black_box(&report)));
    });
}

criterion_group!(benches, bench_probe_recording, bench_snapshot, bench_json_statistics);
criterion_main!(benches);
