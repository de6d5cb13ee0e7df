//! Diagnostic logging
//!
//! Logging is off unless `DRAFTY_LOG` is set to a level (`debug`, `info`,
//! ...). Output goes to the configured log file, or to stderr when none
//! is configured.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use drafty_core::Config;

pub const LOG_ENV: &str = "DRAFTY_LOG";

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(format!("drafty_core={},drafty_cli={}", level, level))
}

/// Load the config at `config_path` and start logging from it
///
/// When the config cannot be loaded, logging starts from the defaults and
/// the error is handed back for the caller to report.
pub fn init_from_config_path(config_path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let loaded = Config::load_with_cli_override(config_path);
    match &loaded {
        Ok(config) => init_logging(config),
        Err(_) => init_logging(&Config::default()),
    }
    loaded
}

/// Install the global subscriber if logging was requested
pub fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let Some(log_path) = config.log_file.clone() else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter_for(&log_level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(&log_level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging to {:?}", log_path);
}
