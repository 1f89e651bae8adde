//! Configuration data model and validation

use crate::types::{AddressFamily, OutputFormat, Result, AppError};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Main application configuration, read-only once the run starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hostname or literal IP address to probe
    #[serde(default)]
    pub target: String,

    /// TCP port to probe
    #[serde(default)]
    pub port: u16,

    /// Address family preference used when resolving `target`
    #[serde(default)]
    pub family: AddressFamily,

    /// Re-resolve the hostname after this many consecutive failures (0 = never)
    #[serde(default)]
    pub retry_resolve_after: u32,

    /// Stop after this many probes (0 = unlimited)
    #[serde(default)]
    pub probes_before_quit: u64,

    /// Time budget of one probe cycle, also used as the connect timeout
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,

    /// Output format
    #[serde(default)]
    pub output: OutputFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: String::new(),
            port: 0,
            family: AddressFamily::Any,
            retry_resolve_after: 0,
            probes_before_quit: 0,
            probe_interval_ms: default_probe_interval_ms(),
            output: OutputFormat::Plain,
            enable_color: default_enable_color(),
            debug: false,
        }
    }
}

impl Config {
    /// Get the probe interval as Duration
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    /// Build the immutable identity of the probed endpoint
    pub fn probe_target(&self) -> ProbeTarget {
        ProbeTarget::new(self.target.clone(), self.port, self.family)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(AppError::config("Target hostname or IP address cannot be empty"));
        }

        if self.port == 0 {
            return Err(AppError::validation("Port should be in 1..65535 range"));
        }

        if self.probe_interval_ms == 0 {
            return Err(AppError::config("Probe interval must be greater than 0"));
        }

        if self.output.is_json() && self.enable_color {
            // JSON output never carries ANSI escapes
            return Err(AppError::config("Colored output cannot be combined with JSON output"));
        }

        Ok(())
    }

    /// Merge settings from an arbitrary key lookup (the process environment in production)
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(retry) = lookup("TCPING_RETRY_RESOLVE_AFTER") {
            self.retry_resolve_after = retry.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TCPING_RETRY_RESOLVE_AFTER value '{}': {}", retry, e)))?;
        }

        if let Some(count) = lookup("TCPING_PROBE_COUNT") {
            self.probes_before_quit = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TCPING_PROBE_COUNT value '{}': {}", count, e)))?;
        }

        if let Some(output) = lookup("TCPING_OUTPUT") {
            self.output = output.parse()
                .map_err(|e| AppError::config(format!("Invalid TCPING_OUTPUT value '{}': {}", output, e)))?;
        }

        if lookup("NO_COLOR").is_some() {
            self.enable_color = false;
        }

        Ok(())
    }
}

/// Immutable per-run identity of the probed endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeTarget {
    /// Hostname or IP exactly as the user typed it
    pub hostname: String,
    pub port: u16,
    pub family: AddressFamily,
    /// The input was already a literal IP address
    pub is_ip: bool,
}

impl ProbeTarget {
    pub fn new(hostname: String, port: u16, family: AddressFamily) -> Self {
        let is_ip = hostname.parse::<IpAddr>().is_ok();
        Self { hostname, port, family, is_ip }
    }

    /// Hostname to display next to the IP, `None` when it would only repeat the IP
    pub fn display_host(&self) -> Option<&str> {
        if self.is_ip {
            None
        } else {
            Some(&self.hostname)
        }
    }
}

fn default_probe_interval_ms() -> u64 {
    crate::defaults::DEFAULT_PROBE_INTERVAL.as_millis() as u64
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
