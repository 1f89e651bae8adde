//! Main application orchestration and execution

use crate::{
    cli::{Cli, HelpSystem},
    config::load_config,
    dns::{AddressResolver, SystemLookup},
    error::{AppError, Result},
    executor::{
        watchers::{spawn_keypress_watcher, spawn_shutdown_watcher},
        ExecutionConfig, ProbeExecutor, RunOutcome,
    },
    logging::{LogLevel, Logger},
    models::Config,
    output::{Reporter, ReporterFactory},
    probe::TcpProber,
    types::OutputFormat,
    updater::UpdateChecker,
    version_info,
};
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
    logger: Logger,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let mut logger = Logger::new("app");
        logger.set_color(cli.use_colors());
        if cli.debug {
            logger.set_level(LogLevel::Debug);
        }
        Self { cli, logger }
    }

    /// Run the requested mode and return the process exit code
    pub async fn run(self) -> i32 {
        let early: Arc<dyn Reporter> =
            Arc::from(ReporterFactory::create(self.requested_format(), self.cli.use_colors()));

        self.logger
            .debug("Starting tcping")
            .field("version", crate::VERSION)
            .field("session_id", self.logger.session_id())
            .log();

        if let Err(e) = self.cli.validate() {
            return self.usage_error(early.as_ref(), Some(&e));
        }

        if self.cli.is_update_mode() {
            return match self.check_updates(early.as_ref()).await {
                Ok(()) => 0,
                Err(e) => self.fail(early.as_ref(), &e),
            };
        }

        if self.cli.is_version_mode() {
            early.print_version(&version_info());
            return 0;
        }

        if self.cli.endpoint().is_none() {
            return self.usage_error(early.as_ref(), None);
        }

        let config = match load_config(self.cli.clone(), self.logger.named("config")) {
            Ok(config) => config,
            Err(e) => return self.fail(early.as_ref(), &e),
        };

        // Environment may have changed the output format
        let reporter: Arc<dyn Reporter> =
            Arc::from(ReporterFactory::create(config.output, config.enable_color));

        match self.probe(&config, reporter.clone()).await {
            Ok(outcome) => {
                self.logger.debug("Run finished").field("outcome", outcome).log();
                0
            }
            Err(e) => self.fail(reporter.as_ref(), &e),
        }
    }

    /// Resolve the target and run the probe loop until it ends
    async fn probe(&self, config: &Config, reporter: Arc<dyn Reporter>) -> Result<RunOutcome> {
        let mut logger = self.logger.clone();
        logger.apply_config(config);

        let target = config.probe_target();
        let resolver = AddressResolver::new(SystemLookup::new(&logger), logger.named("resolver"));
        let ip = resolver.resolve(&target, None, false).await?;

        reporter.print_start(&target.hostname, target.port);

        let keypresses = spawn_keypress_watcher(logger.named("watchers"));
        let shutdown = spawn_shutdown_watcher(logger.named("watchers"));

        let mut executor = ProbeExecutor::new(
            ExecutionConfig::from(config),
            target,
            ip,
            resolver,
            TcpProber::new(),
            reporter,
            logger.named("executor"),
        );
        executor.run(keypresses, shutdown).await
    }

    async fn check_updates(&self, reporter: &dyn Reporter) -> Result<()> {
        let checker = UpdateChecker::new(self.logger.named("updater"))?;
        for line in checker.check().await?.messages() {
            reporter.print_info(&line);
        }
        Ok(())
    }

    fn fail(&self, reporter: &dyn Reporter, error: &AppError) -> i32 {
        self.logger.debug("Exiting with error").error_info(error).log();
        reporter.print_error(&error.to_string());
        error.exit_code()
    }

    fn usage_error(&self, reporter: &dyn Reporter, error: Option<&AppError>) -> i32 {
        if let Some(error) = error {
            reporter.print_error(&error.to_string());
        }
        eprint!("{}", HelpSystem::new().display_usage(self.cli.use_colors()));
        error.map(AppError::exit_code).unwrap_or(1)
    }

    /// Output format asked for on the command line, before any config is read
    fn requested_format(&self) -> OutputFormat {
        match (self.cli.json, self.cli.pretty) {
            (true, true) => OutputFormat::Pretty,
            (true, false) => OutputFormat::Json,
            _ => OutputFormat::Plain,
        }
    }
}
