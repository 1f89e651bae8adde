//! TCP connect probing
//!
//! A probe is a single TCP handshake. The connection is closed as soon as
//! it is established and no payload is ever sent.

use crate::models::ProbeOutcome;
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Something that can check whether an endpoint accepts connections
#[async_trait]
pub trait Prober: Send + Sync {
    /// Attempt one connection. Never fails: refusal, unreachability and
    /// timeouts all come back as an unsuccessful outcome.
    async fn probe(&self, ip: IpAddr, port: u16, timeout: Duration) -> ProbeOutcome;
}

/// Prober dialing real TCP connections through tokio
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, ip: IpAddr, port: u16, timeout: Duration) -> ProbeOutcome {
        let address = SocketAddr::new(ip, port);
        let started = Instant::now();

        let connected = matches!(
            tokio::time::timeout(timeout, TcpStream::connect(address)).await,
            Ok(Ok(_))
        );
        let rtt_ms = started.elapsed().as_secs_f64() * 1000.0;

        if connected {
            ProbeOutcome::success(rtt_ms)
        } else {
            ProbeOutcome::failure(rtt_ms)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Prober replaying a fixed script of outcomes, then failing forever
    #[derive(Clone, Default)]
    pub(crate) struct ScriptedProber {
        script: Arc<Mutex<VecDeque<ProbeOutcome>>>,
        dialed: Arc<Mutex<Vec<IpAddr>>>,
        delay: Duration,
    }

    impl ScriptedProber {
        /// `true` entries succeed with a 10 ms RTT, `false` entries fail
        pub(crate) fn new(script: &[bool]) -> Self {
            let script = script
                .iter()
                .map(|&ok| if ok { ProbeOutcome::success(10.0) } else { ProbeOutcome::failure(0.0) })
                .collect();
            Self {
                script: Arc::new(Mutex::new(script)),
                ..Self::default()
            }
        }

        /// Every probe takes `delay` before answering
        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// Addresses dialed so far, in order
        pub(crate) fn dialed(&self) -> Vec<IpAddr> {
            self.dialed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, ip: IpAddr, _port: u16, _timeout: Duration) -> ProbeOutcome {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.dialed.lock().unwrap().push(ip);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| ProbeOutcome::failure(0.0))
        }
    }
}
