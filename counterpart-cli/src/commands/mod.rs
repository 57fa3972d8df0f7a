//! CLI command implementations

pub mod banks;
pub mod customers;
pub mod logs;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use counterpart_core::services::{LogEvent, LoggingService};
use counterpart_core::CounterpartContext;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let counterpart_dir = get_counterpart_dir();
    std::fs::create_dir_all(&counterpart_dir).ok()?;
    Some(LoggingService::new(&counterpart_dir, env!("CARGO_PKG_VERSION")))
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the counterpart directory from environment or default
pub fn get_counterpart_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("COUNTERPART_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".counterpart")
    }
}

/// Get or create counterpart context
pub fn get_context() -> Result<CounterpartContext> {
    let counterpart_dir = get_counterpart_dir();

    std::fs::create_dir_all(&counterpart_dir).with_context(|| {
        format!(
            "Failed to create counterpart directory: {:?}",
            counterpart_dir
        )
    })?;

    CounterpartContext::new(&counterpart_dir).context("Failed to initialize counterpart context")
}
