//! Hostname to address resolution
//!
//! [`AddressResolver`] turns the user-supplied target into the single IP
//! address that gets probed. Lookups go through the [`HostLookup`] seam so
//! that the resolution policy can be exercised without a DNS server.

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::ProbeTarget,
};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::net::IpAddr;
use trust_dns_resolver::{
    config::{LookupIpStrategy, ResolverConfig, ResolverOpts},
    system_conf, TokioAsyncResolver,
};

/// Source of candidate addresses for a hostname
#[async_trait]
pub trait HostLookup: Send + Sync {
    /// Return every address the name resolves to, in any family
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>>;
}

/// Lookup through the operating system's resolver configuration
pub struct SystemLookup {
    resolver: TokioAsyncResolver,
}

impl SystemLookup {
    /// Build a resolver from the system configuration, falling back to the
    /// library defaults when it cannot be read.
    pub fn new(logger: &Logger) -> Self {
        let (config, mut opts) = match system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                logger
                    .debug("Failed to read system DNS config, using defaults")
                    .field("error", e.to_string())
                    .log();
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        // Family filtering happens afterwards, so ask for both
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl HostLookup for SystemLookup {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>> {
        let response = self.resolver.lookup_ip(host).await?;
        Ok(response.iter().collect())
    }
}

/// Resolution policy applied on startup and on every retry
pub struct AddressResolver<L: HostLookup> {
    lookup: L,
    logger: Logger,
}

impl<L: HostLookup> AddressResolver<L> {
    pub fn new(lookup: L, logger: Logger) -> Self {
        Self { lookup, logger }
    }

    /// Resolve `target` to one address.
    ///
    /// Literal IPs are returned unchanged. When the lookup fails after the
    /// run has already probed something, `previous` is kept and no error is
    /// raised. An empty candidate set for the requested family is always an
    /// error.
    pub async fn resolve(
        &self,
        target: &ProbeTarget,
        previous: Option<IpAddr>,
        has_prior_probes: bool,
    ) -> Result<IpAddr> {
        if let Ok(ip) = target.hostname.parse::<IpAddr>() {
            return Ok(ip);
        }

        let host = target.hostname.as_str();
        let addresses = match self.lookup.lookup(host).await {
            Ok(addresses) if !addresses.is_empty() => addresses,
            outcome => {
                let reason = match outcome {
                    Err(e) => e.to_string(),
                    Ok(_) => "no addresses returned".to_string(),
                };

                if let (true, Some(previous)) = (has_prior_probes, previous) {
                    self.logger
                        .debug("Lookup failed, keeping previous address")
                        .field("host", host)
                        .field("address", previous.to_string())
                        .field("reason", &reason)
                        .log();
                    return Ok(previous);
                }

                self.logger
                    .debug("Initial lookup failed")
                    .field("host", host)
                    .field("reason", &reason)
                    .log();
                return Err(AppError::dns_resolution(format!("Failed to resolve {}", host)));
            }
        };

        let candidates: Vec<IpAddr> = addresses
            .into_iter()
            .filter(|ip| target.family.accepts(ip))
            .collect();

        let chosen = candidates.choose(&mut rand::thread_rng()).copied().ok_or_else(|| {
            AppError::dns_resolution(format!(
                "Failed to find {} address for {}",
                target.family.label(),
                host
            ))
        })?;

        self.logger
            .debug("Resolved target")
            .field("host", host)
            .field("address", chosen.to_string())
            .field("candidates", candidates.len())
            .log();

        Ok(chosen)
    }
}
