//! File logging for the TUI.
//!
//! The terminal is owned by the interface, so log lines go to
//! `<state dir>/logs/keypace.log`. `RUST_LOG` overrides the default filter.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::app_dirs::AppDirs;

pub const LOG_FILE_NAME: &str = "keypace.log";

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "keypace=debug"
    } else {
        "keypace=info"
    }
}

/// Install the global subscriber. Returns the log file path, or `None` when
/// no log file could be opened (logging is then disabled).
pub fn init_logging(verbose: bool) -> Option<PathBuf> {
    let log_dir = AppDirs::log_dir()?;
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {e}");
        return None;
    }

    let log_file = log_dir.join(LOG_FILE_NAME);
    let file = match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {e}");
            return None;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(file)
        .try_init()
        .is_ok();

    installed.then_some(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(default_filter(false), "keypace=info");
        assert_eq!(default_filter(true), "keypace=debug");
    }
}
