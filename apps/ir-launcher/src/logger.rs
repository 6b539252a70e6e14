//! Launcher logging: colored stdout plus a plain log file, installed once per process.

use crate::error::LauncherError;

use common::ErrorLocation;

use std::fmt::{Arguments, Display};
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "ir-launcher.log";

const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

#[cfg(debug_assertions)]
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Install the global logger writing to stdout and `log_dir/ir-launcher.log`.
///
/// `level` overrides [`DEFAULT_LOG_LEVEL`]. Calls after the first log a warning
/// and return Ok without touching the installed logger.
///
/// # Errors
///
/// Returns [`LauncherError::Launcher`] if the log file cannot be created or a
/// global logger is already installed by someone else.
pub fn initialize(log_dir: &Path, level: Option<LevelFilter>) -> Result<(), LauncherError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let level = level.unwrap_or(DEFAULT_LOG_LEVEL);
    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = dispatch(log_dir, level);
        if result.is_ok() {
            info!("Logger initialized with level: {level:?}");
        }
    });

    result
}

#[track_caller]
fn dispatch(log_dir: &Path, level: LevelFilter) -> Result<(), LauncherError> {
    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let log_file = fern::log_file(log_dir.join(LOG_FILE_NAME)).map_err(|e| {
        LauncherError::Launcher {
            message: format!("Failed to create log file in {}: {e}", log_dir.display()),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, message, record, colors.color(record.level()))
        })
        .chain(stdout());

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| write_line(out, message, record, record.level()))
        .chain(log_file);

    Dispatch::new()
        .level(level)
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| LauncherError::Launcher {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

fn write_line(out: FormatCallback, message: &Arguments, record: &Record, level: impl Display) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}
