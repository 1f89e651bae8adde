//! Command-line interface

pub mod help;

pub use help::HelpSystem;

use crate::error::{AppError, Result};
use clap::Parser;

/// Continuously probe a TCP endpoint and report its availability
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tcping")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Hostname or IP address to probe
    #[arg(value_name = "HOST")]
    pub host: Option<String>,

    /// TCP port to probe
    #[arg(value_name = "PORT")]
    pub port: Option<String>,

    /// Use IPv4 only
    #[arg(short = '4')]
    pub ipv4: bool,

    /// Use IPv6 only
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Retry resolving the hostname after <n> consecutive failed probes
    #[arg(short = 'r', value_name = "n")]
    pub retry_resolve_after: Option<u32>,

    /// Do <n> probes and quit; 0 means no limit
    #[arg(short = 'c', value_name = "n")]
    pub count: Option<u64>,

    /// Output in JSON format
    #[arg(short = 'j')]
    pub json: bool,

    /// Indent JSON output; requires -j
    #[arg(long)]
    pub pretty: bool,

    /// Show version
    #[arg(short = 'v')]
    pub version: bool,

    /// Check for updates
    #[arg(short = 'u')]
    pub update: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print diagnostic logs to stderr
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate flag combinations.
    ///
    /// Missing host or port is not checked here: `-u` and `-v` run without
    /// them, see [`Cli::endpoint`].
    pub fn validate(&self) -> Result<()> {
        if self.update && !self.update_is_alone() {
            return Err(AppError::validation("-u flag works on its own"));
        }

        if self.ipv4 && self.ipv6 {
            return Err(AppError::validation("Only one IP version can be specified"));
        }

        if self.pretty && !self.json {
            return Err(AppError::validation("--pretty has no effect without the -j flag."));
        }

        Ok(())
    }

    /// Host and validated port, when both positionals were given
    pub fn endpoint(&self) -> Option<Result<(String, u16)>> {
        match (&self.host, &self.port) {
            (Some(host), Some(port)) => Some(parse_port(port).map(|port| (host.clone(), port))),
            _ => None,
        }
    }

    /// Check if running in update mode
    pub fn is_update_mode(&self) -> bool {
        self.update
    }

    /// Check if only the version should be printed
    pub fn is_version_mode(&self) -> bool {
        self.version && !self.update
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.colors_allowed(std::env::var_os("NO_COLOR").is_some())
    }

    fn colors_allowed(&self, no_color_env: bool) -> bool {
        !no_color_env && !self.no_color && !self.json
    }

    /// `-u` tolerates only the ambient `--debug` and `--no-color` flags
    fn update_is_alone(&self) -> bool {
        self.host.is_none()
            && self.port.is_none()
            && !self.ipv4
            && !self.ipv6
            && self.retry_resolve_after.is_none()
            && self.count.is_none()
            && !self.json
            && !self.pretty
            && !self.version
    }
}

/// Parse a port argument into 1..=65535
pub fn parse_port(arg: &str) -> Result<u16> {
    let port: u16 = arg
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid port number: {}", arg)))?;

    if port == 0 {
        return Err(AppError::validation("Port should be in 1..65535 range"));
    }

    Ok(port)
}
