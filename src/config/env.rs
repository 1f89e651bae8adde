//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::logging::Logger;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if it exists
    pub fn load_env_file(logger: &Logger) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), logger)
    }

    /// Load a specific env file. Variables already set in the process win.
    pub fn load_env_file_from(path: &Path, logger: &Logger) -> Result<()> {
        if !path.exists() {
            logger
                .debug("No env file found")
                .field("path", path.display().to_string())
                .log();
            return Ok(());
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {} file: {}", path.display(), e)))?;

        logger
            .debug("Loaded configuration from env file")
            .field("path", path.display().to_string())
            .log();
        Ok(())
    }

    /// Supported environment variables with descriptions, listed in the usage screen
    pub fn supported_variables() -> &'static [(&'static str, &'static str)] {
        &[
            ("TCPING_RETRY_RESOLVE_AFTER", "Re-resolve the hostname after this many consecutive failures"),
            ("TCPING_PROBE_COUNT", "Stop after this many probes (0 = unlimited)"),
            ("TCPING_OUTPUT", "Output format: plain, json or pretty"),
            ("NO_COLOR", "Disable colored output when set"),
        ]
    }
}
