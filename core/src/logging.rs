//! Logging Setup
//!
//! The terminal belongs to the UI, so log output goes to a file. The filter
//! comes from [`LoggingConfig::filter`] (already merged with `PARLEY_LOG`).

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, LoggingConfig};

/// Install the global subscriber writing to the configured log file
///
/// A second call is a no-op: the first subscriber stays installed.
///
/// # Errors
///
/// Returns an error if the filter does not parse or the log file cannot be
/// opened for appending.
pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|e| {
        ConfigError::ValidationError(format!("invalid log filter '{}': {e}", config.filter))
    })?;

    let open_error = |source| ConfigError::LogFileError {
        path: config.file.clone(),
        source,
    };
    if let Some(parent) = config.file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(open_error)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .map_err(open_error)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(path = %config.file.display(), "Logging initialized");
    }
    Ok(())
}
