//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    logging::Logger,
    models::Config,
    types::{AddressFamily, OutputFormat},
};

/// Builds a [`Config`] from defaults, `.env`, the environment and the CLI,
/// in that order of increasing precedence.
pub struct ConfigParser {
    cli: Cli,
    logger: Logger,
}

impl ConfigParser {
    pub fn new(cli: Cli, logger: Logger) -> Self {
        Self { cli, logger }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file(&self.logger)?;
        self.parse_with_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigParser::parse`] with an explicit variable source and no `.env` file
    pub fn parse_with_lookup<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.merge_from_lookup(lookup)?;
        self.apply_cli_overrides(&mut config)?;
        config.validate()?;

        self.logger
            .debug("Configuration ready")
            .field("summary", display_config_summary(&config))
            .log();
        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        let (host, port) = self
            .cli
            .endpoint()
            .ok_or_else(|| AppError::validation("Both host and port must be specified"))??;
        config.target = host;
        config.port = port;

        config.family = match (self.cli.ipv4, self.cli.ipv6) {
            (true, true) => return Err(AppError::validation("Only one IP version can be specified")),
            (true, false) => AddressFamily::V4,
            (false, true) => AddressFamily::V6,
            (false, false) => config.family,
        };

        if let Some(retry) = self.cli.retry_resolve_after {
            config.retry_resolve_after = retry;
        }

        if let Some(count) = self.cli.count {
            config.probes_before_quit = count;
        }

        if self.cli.json {
            config.output = if self.cli.pretty {
                OutputFormat::Pretty
            } else {
                OutputFormat::Json
            };
        }

        if self.cli.no_color || config.output.is_json() {
            config.enable_color = false;
        }

        config.debug = self.cli.debug;
        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli, logger: Logger) -> Result<Config> {
    ConfigParser::new(cli, logger).parse()
}

/// One-line configuration summary for debug logs
pub fn display_config_summary(config: &Config) -> String {
    format!(
        "target={} port={} family={} retry_resolve_after={} probes_before_quit={} interval={}ms output={} color={}",
        config.target,
        config.port,
        config.family.label(),
        config.retry_resolve_after,
        config.probes_before_quit,
        config.probe_interval_ms,
        config.output,
        config.enable_color,
    )
}
