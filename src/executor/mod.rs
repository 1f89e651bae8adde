//! Probe cycle controller
//!
//! [`ProbeExecutor`] owns the running statistics and drives the fixed-rate
//! loop: optional re-resolution, one probe, statistics update, a check for
//! a pending keypress, then a wait for the next tick. Listeners only talk
//! to it over channels (see [`watchers`]).

pub mod watchers;

use crate::{
    dns::{AddressResolver, HostLookup},
    error::Result,
    logging::Logger,
    models::{Config, ProbeTarget},
    output::Reporter,
    probe::Prober,
    stats::RunningStats,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

/// Loop parameters derived from the run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Consecutive failures before the hostname is resolved again (0 = never)
    pub retry_resolve_after: u32,
    /// Stop after this many probes (0 = run until interrupted)
    pub probes_before_quit: u64,
    /// Cycle period, also the connect timeout
    pub interval: Duration,
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            retry_resolve_after: config.retry_resolve_after,
            probes_before_quit: config.probes_before_quit,
            interval: config.probe_interval(),
        }
    }
}

/// How the probe loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The configured probe count was reached
    Completed,
    /// A termination signal arrived
    Interrupted,
}

enum Step {
    Continue,
    Interrupted,
}

/// Sequential probe loop against one target
pub struct ProbeExecutor<L: HostLookup, P: Prober> {
    config: ExecutionConfig,
    resolver: AddressResolver<L>,
    prober: P,
    reporter: Arc<dyn Reporter>,
    stats: RunningStats,
    logger: Logger,
}

impl<L: HostLookup, P: Prober> ProbeExecutor<L, P> {
    /// Prepare a run against `ip`, the address resolved at startup
    pub fn new(
        config: ExecutionConfig,
        target: ProbeTarget,
        ip: IpAddr,
        resolver: AddressResolver<L>,
        prober: P,
        reporter: Arc<dyn Reporter>,
        logger: Logger,
    ) -> Self {
        let stats = RunningStats::new(target, ip, config.interval, Local::now());
        Self {
            config,
            resolver,
            prober,
            reporter,
            stats,
            logger,
        }
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// Run until the probe limit is reached or `shutdown` fires.
    ///
    /// Only a resolution error that leaves no usable address ends the run
    /// with `Err`; probe failures are folded into the statistics.
    pub async fn run(
        &mut self,
        mut keypresses: mpsc::Receiver<String>,
        shutdown: oneshot::Receiver<()>,
    ) -> Result<RunOutcome> {
        // A dropped sender means nobody can interrupt us, not an interrupt
        let shutdown = async move {
            if shutdown.await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.logger
            .debug("Probe loop started")
            .field("interval_ms", self.config.interval.as_millis() as u64)
            .field("probe_limit", self.config.probes_before_quit)
            .field("retry_resolve_after", self.config.retry_resolve_after)
            .log();

        loop {
            let step = tokio::select! {
                biased;
                _ = &mut shutdown => Step::Interrupted,
                _ = ticker.tick() => Step::Continue,
            };
            if let Step::Interrupted = step {
                return Ok(self.interrupt());
            }

            let step = tokio::select! {
                biased;
                _ = &mut shutdown => Step::Interrupted,
                result = self.cycle() => {
                    result?;
                    Step::Continue
                }
            };
            if let Step::Interrupted = step {
                return Ok(self.interrupt());
            }

            if self.limit_reached() {
                self.reporter.print_statistics(&self.stats.snapshot(Local::now()));
                self.logger
                    .debug("Probe limit reached")
                    .field("probes", self.stats.total_probes())
                    .log();
                return Ok(RunOutcome::Completed);
            }

            if let Ok(line) = keypresses.try_recv() {
                if is_blank_line(&line) {
                    self.reporter.print_statistics(&self.stats.snapshot(Local::now()));
                }
            }
        }
    }

    /// One probe cycle without the pacing wait
    async fn cycle(&mut self) -> Result<()> {
        if self.should_retry_resolve() {
            self.retry_resolve().await?;
        }

        let outcome = self
            .prober
            .probe(self.stats.ip(), self.stats.target().port, self.config.interval)
            .await;
        let now = Local::now();

        if outcome.success {
            self.stats.on_success(outcome.rtt_ms, now, self.reporter.as_ref());
        } else {
            self.stats.on_failure(now, self.reporter.as_ref());
        }
        Ok(())
    }

    fn should_retry_resolve(&self) -> bool {
        let threshold = self.config.retry_resolve_after;
        threshold > 0
            && !self.stats.target().is_ip
            && self.stats.ongoing_unsuccessful() >= u64::from(threshold)
    }

    async fn retry_resolve(&mut self) -> Result<()> {
        let target = self.stats.target().clone();
        self.reporter.print_retrying_to_resolve(&target.hostname);

        let previous = self.stats.ip();
        let ip = self
            .resolver
            .resolve(&target, Some(previous), self.stats.has_probes())
            .await?;

        self.logger
            .debug("Re-resolved target")
            .field("host", &target.hostname)
            .field("previous", previous.to_string())
            .field("current", ip.to_string())
            .log();
        self.stats.record_resolve_retry(ip);
        Ok(())
    }

    fn limit_reached(&self) -> bool {
        self.config.probes_before_quit > 0 && self.stats.total_probes() >= self.config.probes_before_quit
    }

    fn interrupt(&self) -> RunOutcome {
        self.logger
            .debug("Termination requested")
            .field("probes", self.stats.total_probes())
            .log();
        self.reporter.print_statistics(&self.stats.closing_snapshot());
        RunOutcome::Interrupted
    }
}

/// An empty line (just Enter) asks for a statistics snapshot
fn is_blank_line(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']).is_empty()
}
